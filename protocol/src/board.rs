//! 棋盘与执子方

use std::fmt;

use crate::constants::{BOARD_SIZE, CELL_COUNT};

/// 执子方
///
/// 表示对局中的固定身份（先手/后手），入座时分配，连接存续期间不变。
/// 与 `turn`（当前走子方）是两个概念。无执子方一律用 `Option<Role>` 表达，
/// 不使用哨兵数值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// 先手
    First,
    /// 后手
    Second,
}

impl Role {
    /// 获取对方
    pub fn opponent(self) -> Role {
        match self {
            Role::First => Role::Second,
            Role::Second => Role::First,
        }
    }

    /// 线上编码：1 = 先手，2 = 后手
    pub fn as_byte(self) -> u8 {
        match self {
            Role::First => 1,
            Role::Second => 2,
        }
    }

    /// 从线上编码解析，0 表示无执子方
    pub fn from_byte(byte: u8) -> Option<Role> {
        match byte {
            1 => Some(Role::First),
            2 => Some(Role::Second),
            _ => None,
        }
    }
}

/// 无执子方（空格/无回合）的线上编码
pub fn role_to_byte(role: Option<Role>) -> u8 {
    role.map(Role::as_byte).unwrap_or(0)
}

/// 3x3 棋盘，行优先存储
///
/// 不变量：只有经过校验的落子才会写入格子，每次请求至多一个格子由空变为非空。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Role>; CELL_COUNT],
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            cells: [None; CELL_COUNT],
        }
    }

    /// 获取指定格子
    pub fn get(&self, row: u8, col: u8) -> Option<Role> {
        self.cells[Self::index(row, col)]
    }

    /// 设置指定格子
    pub fn set(&mut self, row: u8, col: u8, role: Role) {
        self.cells[Self::index(row, col)] = Some(role);
    }

    /// 行列坐标是否在棋盘内
    pub fn in_bounds(row: u8, col: u8) -> bool {
        (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE
    }

    fn index(row: u8, col: u8) -> usize {
        debug_assert!(Self::in_bounds(row, col));
        row as usize * BOARD_SIZE + col as usize
    }

    /// 棋盘是否已满
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// 指定执子方是否三连
    ///
    /// 检查 3 行、3 列与两条对角线。
    pub fn has_won(&self, role: Role) -> bool {
        const LINES: [[usize; 3]; 8] = [
            [0, 1, 2],
            [3, 4, 5],
            [6, 7, 8],
            [0, 3, 6],
            [1, 4, 7],
            [2, 5, 8],
            [0, 4, 8],
            [2, 4, 6],
        ];
        LINES
            .iter()
            .any(|line| line.iter().all(|&i| self.cells[i] == Some(role)))
    }

    /// 非空格子数量
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// 按行优先顺序导出线上编码（0 = 空格）
    pub fn to_bytes(&self) -> [u8; CELL_COUNT] {
        let mut bytes = [0u8; CELL_COUNT];
        for (byte, cell) in bytes.iter_mut().zip(self.cells.iter()) {
            *byte = role_to_byte(*cell);
        }
        bytes
    }

    /// 从线上编码还原棋盘，遇到 {0,1,2} 之外的字节返回 None
    pub fn from_bytes(bytes: &[u8; CELL_COUNT]) -> Option<Board> {
        let mut board = Board::empty();
        for (i, &byte) in bytes.iter().enumerate() {
            if byte > 2 {
                return None;
            }
            board.cells[i] = Role::from_byte(byte);
        }
        Some(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Board {
    /// 渲染为 3 行文本，X = 先手，O = 后手，. = 空格
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let mark = match self.cells[row * BOARD_SIZE + col] {
                    Some(Role::First) => 'X',
                    Some(Role::Second) => 'O',
                    None => '.',
                };
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", mark)?;
            }
            if row + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
