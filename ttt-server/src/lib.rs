//! 井字棋服务端
//!
//! 包含:
//! - 对局状态机
//! - 连接注册表
//! - 事件编排循环

pub mod registry;
pub mod server;
pub mod session;

pub use registry::{ConnId, PeerEvent, Registry};
pub use server::Server;
pub use session::Session;
