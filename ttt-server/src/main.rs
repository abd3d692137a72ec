use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use protocol::NetworkConfig;
use ttt_server::Server;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("ttt_server=debug".parse()?))
        .init();

    // 端口取第一个命令行参数，缺省用协议默认端口
    let mut config = NetworkConfig {
        host: "0.0.0.0".to_string(),
        ..NetworkConfig::default()
    };
    if let Some(port) = std::env::args().nth(1) {
        config.port = port.parse()?;
    }

    info!("井字棋服务端启动中...");
    let server = Server::bind(&config).await?;
    server.run().await?;

    Ok(())
}
