//! 协议常量定义

use std::time::Duration;

/// 棋盘边长（行数 = 列数）
pub const BOARD_SIZE: usize = 3;

/// 棋盘格子总数
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// 帧头大小：4 字节大端序长度
pub const HEADER_SIZE: usize = 4;

/// 消息帧最大大小，超过即视为恶意或损坏的连接
pub const MAX_FRAME_SIZE: usize = 1024;

/// 状态消息负载大小：状态 1 + 回合 1 + 己方执子 1 + 棋盘 9
pub const STATE_PAYLOAD_LEN: usize = 3 + CELL_COUNT;

/// 落子请求负载大小：行列各 1 字节 ASCII 数字
pub const MOVE_PAYLOAD_LEN: usize = 2;

/// 每局座位数（本协议固定两人对战）
pub const SEAT_COUNT: usize = 2;

/// 默认监听/连接端口
pub const DEFAULT_PORT: u16 = 9527;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);
