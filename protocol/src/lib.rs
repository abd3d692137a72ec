//! 井字棋共享协议库
//!
//! 包含:
//! - 棋盘、执子方等核心数据结构
//! - 消息类型定义与定长二进制编解码 (StateMessage, MoveRequest)
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 整帧收发 (FrameReader, FrameWriter)

mod board;
mod constants;
mod error;
mod message;
mod transport;

pub use board::{role_to_byte, Board, Role};
pub use constants::*;
pub use error::{GameError, ProtocolError, Result};
pub use message::{GameStatus, MoveRequest, StateMessage};
pub use transport::{
    Connection, Connector, FrameReader, FrameWriter, Listener, NetworkConfig, TcpConnection,
    TcpConnector, TcpListener,
};
