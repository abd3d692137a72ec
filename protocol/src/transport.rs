//! 传输层抽象
//!
//! 提供 Connector/Connection/Listener traits 使上层协议与具体传输实现解耦，
//! 并实现整帧收发：每条消息前缀 4 字节大端序长度，发送/接收要么完成整帧，
//! 要么判定连接失效，不存在半途取消。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::constants::{CONNECT_TIMEOUT, DEFAULT_PORT, HEADER_SIZE, MAX_FRAME_SIZE};
use crate::error::{ProtocolError, Result};

/// 网络配置
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
}

impl NetworkConfig {
    /// 组合为 `host:port` 地址串
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// 连接抽象 trait（核心抽象，用于业务层）
#[async_trait]
pub trait Connection: Send + Sync {
    /// 发送一帧
    async fn send(&mut self, payload: &[u8]) -> Result<()>;

    /// 接收一帧
    async fn recv(&mut self) -> Result<Vec<u8>>;

    /// 关闭连接
    async fn close(&mut self) -> Result<()>;

    /// 获取远端地址
    fn peer_addr(&self) -> Option<String>;
}

/// 连接器 trait（客户端使用）
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: Connection;

    /// 建立连接
    async fn connect(&self, addr: &str) -> Result<Self::Conn>;
}

/// 监听器 trait（服务端使用）
#[async_trait]
pub trait Listener: Send + Sync + Sized {
    type Conn: Connection;

    /// 绑定地址
    async fn bind(addr: &str) -> Result<Self>;

    /// 接受连接
    async fn accept(&mut self) -> Result<Self::Conn>;

    /// 获取本地地址
    fn local_addr(&self) -> Option<String>;
}

// ============================================================================
// TCP 实现
// ============================================================================

/// TCP 连接器
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Conn = TcpConnection;

    async fn connect(&self, addr: &str) -> Result<Self::Conn> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| ProtocolError::ConnectionTimeout)?
            .map_err(ProtocolError::Io)?;

        TcpConnection::from_stream(stream)
    }
}

/// TCP 连接
pub struct TcpConnection {
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
    peer_addr: Option<String>,
}

impl TcpConnection {
    /// 从 TcpStream 创建（服务端使用）
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let peer_addr = stream.peer_addr().ok().map(|a| a.to_string());
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: FrameReader::new(read_half),
            writer: FrameWriter::new(write_half),
            peer_addr,
        })
    }

    /// 分离读写端
    pub fn split(self) -> (FrameReader<OwnedReadHalf>, FrameWriter<OwnedWriteHalf>) {
        (self.reader, self.writer)
    }
}

#[async_trait]
impl Connection for TcpConnection {
    async fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.writer.write_frame(payload).await
    }

    async fn recv(&mut self) -> Result<Vec<u8>> {
        self.reader.read_frame().await
    }

    async fn close(&mut self) -> Result<()> {
        // TCP 连接会在 drop 时自动关闭
        Ok(())
    }

    fn peer_addr(&self) -> Option<String> {
        self.peer_addr.clone()
    }
}

/// TCP 监听器
pub struct TcpListener {
    listener: tokio::net::TcpListener,
}

#[async_trait]
impl Listener for TcpListener {
    type Conn = TcpConnection;

    async fn bind(addr: &str) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(ProtocolError::Io)?;
        Ok(Self { listener })
    }

    async fn accept(&mut self) -> Result<Self::Conn> {
        let (stream, _addr) = self.listener.accept().await.map_err(ProtocolError::Io)?;
        TcpConnection::from_stream(stream)
    }

    fn local_addr(&self) -> Option<String> {
        self.listener.local_addr().ok().map(|a| a.to_string())
    }
}

// ============================================================================
// 帧编解码
// ============================================================================

/// 帧读取器
pub struct FrameReader<R> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin + Send> FrameReader<R> {
    /// 创建新的帧读取器
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
        }
    }

    /// 读取一帧消息
    ///
    /// 声明长度超过 [`MAX_FRAME_SIZE`] 的帧直接拒绝而非截断，调用方应将该
    /// 连接视为恶意或已损坏并关闭。
    pub async fn read_frame(&mut self) -> Result<Vec<u8>> {
        // 读取帧头
        let mut header = [0u8; HEADER_SIZE];
        self.reader.read_exact(&mut header).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ProtocolError::ConnectionClosed
            } else {
                ProtocolError::Io(e)
            }
        })?;

        // 解析长度（大端序）
        let length = u32::from_be_bytes(header) as usize;

        // 检查帧大小
        if length > MAX_FRAME_SIZE {
            tracing::warn!(length, max = MAX_FRAME_SIZE, "对端声明的帧长度超限");
            return Err(ProtocolError::FrameTooLarge {
                size: length,
                max: MAX_FRAME_SIZE,
            });
        }

        // 读取消息体
        if self.buffer.len() < length {
            self.buffer.resize(length, 0);
        }
        self.reader
            .read_exact(&mut self.buffer[..length])
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    ProtocolError::ConnectionClosed
                } else {
                    ProtocolError::Io(e)
                }
            })?;

        Ok(self.buffer[..length].to_vec())
    }

    /// 接收消息（read_frame 的别名）
    pub async fn recv(&mut self) -> Result<Vec<u8>> {
        self.read_frame().await
    }
}

/// 帧写入器
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> FrameWriter<W> {
    /// 创建新的帧写入器
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// 写入一帧消息
    pub async fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        // 检查大小
        if payload.len() > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                size: payload.len(),
                max: MAX_FRAME_SIZE,
            });
        }

        // 构造帧头
        let header = (payload.len() as u32).to_be_bytes();

        // 写入帧头和消息体
        self.writer.write_all(&header).await?;
        self.writer.write_all(payload).await?;
        self.writer.flush().await?;

        Ok(())
    }

    /// 发送消息（write_frame 的别名）
    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.write_frame(payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tcp_frame_round_trip() {
        // 启动监听
        let mut listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // 客户端连接并发送一帧
        let client_handle = tokio::spawn(async move {
            let connector = TcpConnector;
            let mut conn = connector.connect(&addr).await.unwrap();

            conn.send(b"22").await.unwrap();

            // 接收响应
            let payload = conn.recv().await.unwrap();
            assert_eq!(payload, b"response");
        });

        // 服务端接受连接
        let mut conn = listener.accept().await.unwrap();

        let payload = conn.recv().await.unwrap();
        assert_eq!(payload, b"22");

        conn.send(b"response").await.unwrap();

        client_handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_frame() {
        let mut listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client_handle = tokio::spawn(async move {
            let connector = TcpConnector;
            let mut conn = connector.connect(&addr).await.unwrap();
            conn.send(b"").await.unwrap();
        });

        let mut conn = listener.accept().await.unwrap();
        let payload = conn.recv().await.unwrap();
        assert!(payload.is_empty());

        client_handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let mut listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // 直接用裸流写入超限帧头，模拟恶意客户端
        let client_handle = tokio::spawn(async move {
            let mut stream = TcpStream::connect(&addr).await.unwrap();
            let header = ((MAX_FRAME_SIZE + 1) as u32).to_be_bytes();
            stream.write_all(&header).await.unwrap();
            stream
        });

        let mut conn = listener.accept().await.unwrap();
        let result = conn.recv().await;
        assert!(matches!(
            result,
            Err(ProtocolError::FrameTooLarge { max: MAX_FRAME_SIZE, .. })
        ));

        drop(client_handle.await.unwrap());
    }

    #[tokio::test]
    async fn test_peer_close_detected() {
        let mut listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client_handle = tokio::spawn(async move {
            let connector = TcpConnector;
            let conn = connector.connect(&addr).await.unwrap();
            drop(conn);
        });

        let mut conn = listener.accept().await.unwrap();
        client_handle.await.unwrap();

        let result = conn.recv().await;
        assert!(matches!(result, Err(ProtocolError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_write_oversized_rejected() {
        let mut listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client_handle = tokio::spawn(async move {
            let connector = TcpConnector;
            connector.connect(&addr).await.unwrap()
        });

        let _server_conn = listener.accept().await.unwrap();
        let mut conn = client_handle.await.unwrap();

        let oversized = vec![0u8; MAX_FRAME_SIZE + 1];
        let result = conn.send(&oversized).await;
        assert!(matches!(result, Err(ProtocolError::FrameTooLarge { .. })));
    }
}
