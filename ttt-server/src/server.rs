//! 事件编排循环
//!
//! 服务端的单一控制流：在监听器与对端事件通道之间等待就绪，逐个处理
//! 接入/请求/断开事件。对局状态只在这个循环里变更，无需加锁。

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use protocol::{Connection, GameError, GameStatus, Listener, MoveRequest, NetworkConfig, Result, Role,
    TcpConnection, TcpListener};

use crate::registry::{ConnId, PeerEvent, Registry};
use crate::session::Session;

/// 事件通道容量
const EVENT_CAPACITY: usize = 64;

/// 井字棋服务端
pub struct Server {
    listener: TcpListener,
    registry: Registry,
    session: Session,
    event_rx: mpsc::Receiver<PeerEvent>,
}

impl Server {
    /// 绑定监听地址并初始化会话
    pub async fn bind(config: &NetworkConfig) -> Result<Self> {
        let listener = TcpListener::bind(&config.addr()).await?;
        let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);

        Ok(Self {
            listener,
            registry: Registry::new(event_tx),
            session: Session::new(),
            event_rx,
        })
    }

    /// 获取实际监听地址
    pub fn local_addr(&self) -> Option<String> {
        self.listener.local_addr()
    }

    /// 运行事件循环，直到进程退出
    ///
    /// 任何单个连接的失败只影响该连接及当前对局，不会终止服务进程。
    pub async fn run(mut self) -> Result<()> {
        if let Some(addr) = self.local_addr() {
            info!(%addr, "开始监听");
        }

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok(conn) => self.handle_accept(conn).await,
                        Err(err) => warn!(error = %err, "接受连接失败"),
                    }
                }
                Some(event) = self.event_rx.recv() => {
                    match event {
                        PeerEvent::Request { conn, payload } => {
                            self.handle_request(conn, payload).await;
                        }
                        PeerEvent::Closed { conn } => self.handle_closed(conn).await,
                    }
                }
            }
        }
    }

    /// 接入新连接：注册、入座并回发状态
    async fn handle_accept(&mut self, conn: TcpConnection) {
        let peer_addr = conn.peer_addr();
        let id = self.registry.admit(conn);

        match self.session.admit_player(id) {
            Some(Role::First) => {
                info!(conn = id, addr = ?peer_addr, "玩家一入座，等待对手");
                self.send_state(id).await;
            }
            Some(Role::Second) => {
                info!(conn = id, addr = ?peer_addr, "玩家二入座，对局开始");
                self.broadcast_state().await;
            }
            None => {
                // 座位已满，连接保持注册但无执子方
                info!(conn = id, addr = ?peer_addr, "座位已满，连接以旁观身份保留");
                self.send_state(id).await;
            }
        }
    }

    /// 处理一帧落子请求
    async fn handle_request(&mut self, conn: ConnId, payload: Vec<u8>) {
        let outcome = match MoveRequest::decode(&payload) {
            Ok(request) => match self.session.role_of(conn) {
                Some(role) => self
                    .session
                    .apply_move(role, request)
                    .map(|()| request),
                // 未入座的连接没有回合可言
                None => Err(GameError::IllegalTurn),
            },
            Err(err) => Err(err),
        };

        match outcome {
            Ok(request) => {
                debug!(
                    conn,
                    row = request.row,
                    col = request.col,
                    "落子成功\n{}",
                    self.session.board()
                );
                self.broadcast_state().await;

                if self.session.is_concluded() {
                    info!(status = ?self.session.status(), "对局结束，会话重置等待新玩家");
                    self.session.reset();
                }
            }
            Err(err) => {
                // 客户端输入错误：仅向请求方重发当前状态，对局不受影响
                debug!(conn, error = %err, "拒绝落子请求，重发当前状态");
                self.send_state(conn).await;
            }
        }
    }

    /// 处理连接失效
    async fn handle_closed(&mut self, conn: ConnId) {
        self.registry.remove(conn);

        let Some(role) = self.session.role_of(conn) else {
            info!(conn, "未入座连接断开");
            return;
        };

        if self.session.status() == GameStatus::Active {
            // 对局进行中离线：幸存方记为胜者并收到 Disconnected 状态
            self.session.disconnect(role);
            info!(conn, ?role, "玩家中途离线，判幸存方获胜");
            if let Some(survivor) = self.session.seat(role.opponent()) {
                self.send_state(survivor).await;
            }
        } else {
            info!(conn, ?role, "玩家离开");
        }

        self.session.reset();
    }

    /// 向指定连接发送其个性化状态快照
    async fn send_state(&self, conn: ConnId) {
        let snapshot = self.session.snapshot(self.session.role_of(conn));
        self.registry.send(conn, snapshot.encode().to_vec()).await;
    }

    /// 向两个座位广播各自的个性化状态快照
    async fn broadcast_state(&self) {
        for (role, conn) in self.session.seated() {
            let snapshot = self.session.snapshot(Some(role));
            self.registry.send(conn, snapshot.encode().to_vec()).await;
        }
    }
}
