//! 井字棋终端客户端
//!
//! 顺序循环：接收一帧权威状态 -> 渲染棋盘 -> 轮到自己时读取输入并发送
//! 落子请求。除同一套线上协议外不依赖任何额外控制通道。

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use protocol::{
    Connection, Connector, GameStatus, MoveRequest, NetworkConfig, StateMessage, TcpConnector,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 用法: ttt-client [主机] [端口]
    let mut args = std::env::args().skip(1);
    let mut config = NetworkConfig::default();
    if let Some(host) = args.next() {
        config.host = host;
    }
    if let Some(port) = args.next() {
        config.port = port.parse().context("端口号无效")?;
    }

    let addr = config.addr();
    println!("正在连接 {addr} ...");
    let mut conn = TcpConnector
        .connect(&addr)
        .await
        .context("连接服务器失败")?;
    println!("已连接，等待服务器消息");

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let payload = match conn.recv().await {
            Ok(payload) => payload,
            Err(_) => {
                println!("与服务器的连接已断开");
                break;
            }
        };
        let state = StateMessage::decode(&payload).context("服务器消息损坏")?;

        println!();
        println!("{}", state.board);
        println!();

        match state.status {
            GameStatus::Waiting => println!("等待对手加入..."),
            GameStatus::Active => {
                if state.your_role.is_none() {
                    println!("座位已满，当前为旁观模式");
                } else if state.turn == state.your_role {
                    let request = prompt_move(&mut input).await?;
                    conn.send(&request.encode()).await?;
                } else {
                    println!("等待对方落子...");
                }
            }
            GameStatus::Finished => {
                if state.turn == state.your_role {
                    println!("你赢了！");
                } else {
                    println!("你输了");
                }
                break;
            }
            GameStatus::Tied => {
                println!("平局");
                break;
            }
            GameStatus::Disconnected => {
                println!("对方已离线，判你获胜");
                break;
            }
        }
    }

    conn.close().await?;
    Ok(())
}

/// 反复提示直到读到一条合法落子
async fn prompt_move(input: &mut Lines<BufReader<Stdin>>) -> Result<MoveRequest> {
    loop {
        println!("请输入落子 <行><列>（1-3，如 22 表示中心）:");
        let Some(line) = input.next_line().await? else {
            bail!("标准输入已关闭");
        };
        match MoveRequest::decode(line.trim().as_bytes()) {
            Ok(request) => return Ok(request),
            Err(_) => println!("输入无效，请输入两位 1-3 的数字"),
        }
    }
}
