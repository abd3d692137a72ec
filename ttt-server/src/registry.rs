//! 连接注册表
//!
//! 维护所有已接入的对端连接。每个连接配一个读取任务与一个写出任务，
//! 读取到的整帧经单一 mpsc 通道汇入编排循环，保证对局状态的所有变更
//! 被线性化；写出经各自的外发队列，发送失败不单独处理，断线统一由
//! 读取侧判定。

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use protocol::TcpConnection;

/// 连接句柄
pub type ConnId = u64;

/// 每个连接外发队列的容量
const OUTBOUND_CAPACITY: usize = 16;

/// 对端连接产生的事件
#[derive(Debug)]
pub enum PeerEvent {
    /// 收到一帧完整请求
    Request { conn: ConnId, payload: Vec<u8> },
    /// 连接失效（对端关闭、IO 错误或帧超限）
    Closed { conn: ConnId },
}

/// 已注册的对端
struct Peer {
    outbound: mpsc::Sender<Vec<u8>>,
    reader: JoinHandle<()>,
}

/// 连接注册表
pub struct Registry {
    /// 连接句柄 -> 对端，BTreeMap 保证 peers() 的有序遍历
    peers: BTreeMap<ConnId, Peer>,
    /// 句柄生成器，单调递增
    next_id: AtomicU64,
    /// 汇入编排循环的事件通道
    event_tx: mpsc::Sender<PeerEvent>,
}

impl Registry {
    pub fn new(event_tx: mpsc::Sender<PeerEvent>) -> Self {
        Self {
            peers: BTreeMap::new(),
            next_id: AtomicU64::new(1),
            event_tx,
        }
    }

    /// 接纳一个新连接，分配句柄并启动其读写任务
    pub fn admit(&mut self, conn: TcpConnection) -> ConnId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (mut frame_reader, mut frame_writer) = conn.split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<Vec<u8>>(OUTBOUND_CAPACITY);

        // 写出任务
        tokio::spawn(async move {
            while let Some(payload) = outbound_rx.recv().await {
                if frame_writer.write_frame(&payload).await.is_err() {
                    break;
                }
            }
        });

        // 读取任务：任何接收失败产生一次 Closed 事件后退出
        let event_tx = self.event_tx.clone();
        let reader = tokio::spawn(async move {
            loop {
                match frame_reader.read_frame().await {
                    Ok(payload) => {
                        let event = PeerEvent::Request { conn: id, payload };
                        if event_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::debug!(conn = id, error = %err, "连接读取结束");
                        let _ = event_tx.send(PeerEvent::Closed { conn: id }).await;
                        break;
                    }
                }
            }
        });

        self.peers.insert(
            id,
            Peer {
                outbound: outbound_tx,
                reader,
            },
        );
        id
    }

    /// 注销连接：终止读取任务并丢弃外发队列，底层套接字随之关闭
    pub fn remove(&mut self, id: ConnId) {
        if let Some(peer) = self.peers.remove(&id) {
            peer.reader.abort();
        }
    }

    /// 按句柄升序遍历当前注册的连接
    pub fn peers(&self) -> impl Iterator<Item = ConnId> + '_ {
        self.peers.keys().copied()
    }

    /// 连接是否仍在注册表中
    pub fn contains(&self, id: ConnId) -> bool {
        self.peers.contains_key(&id)
    }

    /// 当前注册的连接数
    pub fn count(&self) -> usize {
        self.peers.len()
    }

    /// 向指定连接发送一帧负载
    ///
    /// 连接不存在或外发队列已关闭时静默丢弃。
    pub async fn send(&self, id: ConnId, payload: Vec<u8>) {
        if let Some(peer) = self.peers.get(&id) {
            let _ = peer.outbound.send(payload).await;
        }
    }
}
