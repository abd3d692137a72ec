//! 错误类型定义

use thiserror::Error;

/// 对局规则错误
///
/// 客户端输入类错误，服务端就地恢复：拒绝该请求并向发送方重发当前状态。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// 落子请求格式错误（非 '1'..'3' 的 ASCII 数字或负载过短）
    #[error("Malformed move request")]
    MalformedMove,

    /// 无效落子（目标格已被占用）
    #[error("Invalid move: cell ({row}, {col}) is occupied")]
    InvalidMove { row: u8, col: u8 },

    /// 不是你的回合
    #[error("Not your turn")]
    IllegalTurn,
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 帧大小超限
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,

    /// 状态消息负载损坏
    #[error("Malformed state message: {reason}")]
    MalformedState { reason: &'static str },

    /// 对局规则错误
    #[error("Game error: {0}")]
    Game(#[from] GameError),
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
