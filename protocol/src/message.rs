//! 消息类型定义与编解码
//!
//! 线上格式为定长二进制（区别于早期原型的文本编码），消除解析歧义并保证
//! 消息大小有界：
//! - 服务端 -> 客户端：`[status:1][turn:1][your_role:1][board:9]` 共 12 字节
//! - 客户端 -> 服务端：`[row '1'-'3'][col '1'-'3']` 共 2 字节

use crate::board::{role_to_byte, Board, Role};
use crate::constants::{CELL_COUNT, MOVE_PAYLOAD_LEN, STATE_PAYLOAD_LEN};
use crate::error::{GameError, ProtocolError};

/// 对局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// 等待玩家加入（0 或 1 人）
    Waiting,
    /// 对局进行中（2 人）
    Active,
    /// 一方三连获胜
    Finished,
    /// 满盘平局
    Tied,
    /// 一方中途离线
    Disconnected,
}

impl GameStatus {
    /// 线上编码
    pub fn as_byte(self) -> u8 {
        match self {
            GameStatus::Waiting => b'W',
            GameStatus::Active => b'A',
            GameStatus::Finished => b'F',
            GameStatus::Tied => b'T',
            GameStatus::Disconnected => b'D',
        }
    }

    /// 从线上编码解析
    pub fn from_byte(byte: u8) -> Option<GameStatus> {
        match byte {
            b'W' => Some(GameStatus::Waiting),
            b'A' => Some(GameStatus::Active),
            b'F' => Some(GameStatus::Finished),
            b'T' => Some(GameStatus::Tied),
            b'D' => Some(GameStatus::Disconnected),
            _ => None,
        }
    }
}

/// 服务端广播给客户端的权威状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMessage {
    /// 对局状态
    pub status: GameStatus,
    /// 当前走子方，None 表示无进行中的回合
    pub turn: Option<Role>,
    /// 接收方自己的执子方，None 表示未入座
    pub your_role: Option<Role>,
    /// 棋盘快照
    pub board: Board,
}

impl StateMessage {
    /// 编码为 12 字节负载
    pub fn encode(&self) -> [u8; STATE_PAYLOAD_LEN] {
        let mut payload = [0u8; STATE_PAYLOAD_LEN];
        payload[0] = self.status.as_byte();
        payload[1] = role_to_byte(self.turn);
        payload[2] = role_to_byte(self.your_role);
        payload[3..].copy_from_slice(&self.board.to_bytes());
        payload
    }

    /// 从负载解码（客户端使用）
    pub fn decode(payload: &[u8]) -> Result<StateMessage, ProtocolError> {
        if payload.len() != STATE_PAYLOAD_LEN {
            return Err(ProtocolError::MalformedState {
                reason: "unexpected payload length",
            });
        }

        let status = GameStatus::from_byte(payload[0]).ok_or(ProtocolError::MalformedState {
            reason: "unknown status byte",
        })?;
        if payload[1] > 2 || payload[2] > 2 {
            return Err(ProtocolError::MalformedState {
                reason: "role byte out of range",
            });
        }

        let mut cells = [0u8; CELL_COUNT];
        cells.copy_from_slice(&payload[3..]);
        let board = Board::from_bytes(&cells).ok_or(ProtocolError::MalformedState {
            reason: "board byte out of range",
        })?;

        Ok(StateMessage {
            status,
            turn: Role::from_byte(payload[1]),
            your_role: Role::from_byte(payload[2]),
            board,
        })
    }
}

/// 客户端发送给服务端的落子请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    /// 行，0 起始
    pub row: u8,
    /// 列，0 起始
    pub col: u8,
}

impl MoveRequest {
    /// 编码为 2 字节 ASCII 数字负载（客户端使用）
    pub fn encode(&self) -> [u8; MOVE_PAYLOAD_LEN] {
        [self.row + b'1', self.col + b'1']
    }

    /// 从负载解码
    ///
    /// 取负载前两个字节按 ASCII 数字 '1'..'3' 转为 0 起始下标，
    /// 越界或负载过短均为 [`GameError::MalformedMove`]。
    pub fn decode(payload: &[u8]) -> Result<MoveRequest, GameError> {
        if payload.len() < MOVE_PAYLOAD_LEN {
            return Err(GameError::MalformedMove);
        }

        let row = payload[0].wrapping_sub(b'1');
        let col = payload[1].wrapping_sub(b'1');
        if !Board::in_bounds(row, col) {
            return Err(GameError::MalformedMove);
        }

        Ok(MoveRequest { row, col })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_byte_round_trip() {
        let statuses = [
            GameStatus::Waiting,
            GameStatus::Active,
            GameStatus::Finished,
            GameStatus::Tied,
            GameStatus::Disconnected,
        ];
        for status in statuses {
            assert_eq!(GameStatus::from_byte(status.as_byte()), Some(status));
        }
        assert_eq!(GameStatus::from_byte(b'X'), None);
    }

    #[test]
    fn test_state_message_layout() {
        let mut board = Board::empty();
        board.set(1, 1, Role::First);

        let msg = StateMessage {
            status: GameStatus::Active,
            turn: Some(Role::Second),
            your_role: Some(Role::First),
            board,
        };

        let payload = msg.encode();
        assert_eq!(payload.len(), STATE_PAYLOAD_LEN);
        assert_eq!(payload[0], b'A');
        assert_eq!(payload[1], 2);
        assert_eq!(payload[2], 1);
        assert_eq!(&payload[3..], &[0, 0, 0, 0, 1, 0, 0, 0, 0]);

        let decoded = StateMessage::decode(&payload).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_state_message_waiting() {
        // 首位玩家入座后收到的快照：W 状态、无回合、执先手、空棋盘
        let msg = StateMessage {
            status: GameStatus::Waiting,
            turn: None,
            your_role: Some(Role::First),
            board: Board::empty(),
        };

        let payload = msg.encode();
        assert_eq!(payload[0], b'W');
        assert_eq!(payload[1], 0);
        assert_eq!(payload[2], 1);
        assert!(payload[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_state_decode_rejects_malformed() {
        assert!(StateMessage::decode(&[b'A'; 5]).is_err());

        let mut payload = StateMessage {
            status: GameStatus::Active,
            turn: Some(Role::First),
            your_role: Some(Role::Second),
            board: Board::empty(),
        }
        .encode();
        payload[0] = b'Z';
        assert!(StateMessage::decode(&payload).is_err());

        payload[0] = b'A';
        payload[1] = 9;
        assert!(StateMessage::decode(&payload).is_err());
    }

    #[test]
    fn test_move_round_trip() {
        // 全部 9 个坐标编码再解码应还原
        for row in 0..3u8 {
            for col in 0..3u8 {
                let request = MoveRequest { row, col };
                let decoded = MoveRequest::decode(&request.encode()).unwrap();
                assert_eq!(decoded, request);
            }
        }
    }

    #[test]
    fn test_move_decode_center() {
        let request = MoveRequest::decode(b"22").unwrap();
        assert_eq!(request, MoveRequest { row: 1, col: 1 });
    }

    #[test]
    fn test_move_decode_rejects_out_of_range() {
        assert_eq!(MoveRequest::decode(b"04"), Err(GameError::MalformedMove));
        assert_eq!(MoveRequest::decode(b"41"), Err(GameError::MalformedMove));
        assert_eq!(MoveRequest::decode(b"ab"), Err(GameError::MalformedMove));
        assert_eq!(MoveRequest::decode(b"1"), Err(GameError::MalformedMove));
        assert_eq!(MoveRequest::decode(b""), Err(GameError::MalformedMove));
    }

    #[test]
    fn test_move_decode_ignores_trailing_bytes() {
        // 仅取前两个字节，多余字节忽略
        let request = MoveRequest::decode(b"13\n").unwrap();
        assert_eq!(request, MoveRequest { row: 0, col: 2 });
    }
}
