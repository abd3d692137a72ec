//! 对局状态机
//!
//! 单进程唯一的权威对局实例。授权（是否轮到你）、合法性（目标格是否可落）
//! 与终局判定（三连/满盘）集中在 [`Session::apply_move`] 一处完成，所有
//! 变更路径都经由它或 [`Session::disconnect`]，棋盘不可能进入不一致状态。

use protocol::{Board, GameError, GameStatus, MoveRequest, Role, StateMessage, SEAT_COUNT};

use crate::registry::ConnId;

/// 对局会话
///
/// 持有棋盘、当前走子方、对局状态与两个座位。进程启动时创建一次，之后仅由
/// 编排循环串行变更；座位上的玩家离线或对局结束时整体重置，供下一对玩家
/// 开新局。
pub struct Session {
    board: Board,
    /// 当前走子方，None 表示没有进行中的回合
    turn: Option<Role>,
    status: GameStatus,
    /// 座位，下标 0 = 先手，1 = 后手
    seats: [Option<ConnId>; SEAT_COUNT],
}

impl Session {
    /// 创建初始会话：空棋盘、无回合、等待玩家
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
            turn: None,
            status: GameStatus::Waiting,
            seats: [None; SEAT_COUNT],
        }
    }

    /// 当前对局状态
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// 当前走子方
    pub fn turn(&self) -> Option<Role> {
        self.turn
    }

    /// 当前棋盘
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 玩家入座
    ///
    /// 第一个玩家入座后继续等待，第二个玩家入座即开局（先手先走）。
    /// 座位已满时返回 None，连接保持注册但不参与对局。
    pub fn admit_player(&mut self, conn: ConnId) -> Option<Role> {
        if self.seats[0].is_none() {
            self.seats[0] = Some(conn);
            self.status = GameStatus::Waiting;
            self.turn = None;
            Some(Role::First)
        } else if self.seats[1].is_none() {
            self.seats[1] = Some(conn);
            self.status = GameStatus::Active;
            self.turn = Some(Role::First);
            Some(Role::Second)
        } else {
            None
        }
    }

    /// 查询连接对应的执子方
    pub fn role_of(&self, conn: ConnId) -> Option<Role> {
        if self.seats[0] == Some(conn) {
            Some(Role::First)
        } else if self.seats[1] == Some(conn) {
            Some(Role::Second)
        } else {
            None
        }
    }

    /// 查询执子方对应的连接
    pub fn seat(&self, role: Role) -> Option<ConnId> {
        match role {
            Role::First => self.seats[0],
            Role::Second => self.seats[1],
        }
    }

    /// 当前所有已入座的 (执子方, 连接)
    pub fn seated(&self) -> Vec<(Role, ConnId)> {
        [Role::First, Role::Second]
            .into_iter()
            .filter_map(|role| self.seat(role).map(|conn| (role, conn)))
            .collect()
    }

    /// 执行落子
    ///
    /// 校验严格先于变更：被拒绝的请求不会触碰棋盘。成功落子后依次判定
    /// 获胜（3 行、3 列、两对角线）与平局（满盘），否则交换回合。获胜时
    /// `turn` 保持在获胜方，作为状态广播中的胜者标记。
    pub fn apply_move(&mut self, role: Role, request: MoveRequest) -> Result<(), GameError> {
        if self.status != GameStatus::Active || self.turn != Some(role) {
            return Err(GameError::IllegalTurn);
        }
        if !Board::in_bounds(request.row, request.col)
            || self.board.get(request.row, request.col).is_some()
        {
            return Err(GameError::InvalidMove {
                row: request.row,
                col: request.col,
            });
        }

        self.board.set(request.row, request.col, role);

        if self.board.has_won(role) {
            self.status = GameStatus::Finished;
        } else if self.board.is_full() {
            self.status = GameStatus::Tied;
        } else {
            self.turn = Some(role.opponent());
        }
        Ok(())
    }

    /// 一方中途离线
    ///
    /// 状态置为 Disconnected，`turn` 指向幸存方，将其记为隐含胜者；
    /// 随后由编排循环广播并调用 [`Session::reset`]。
    pub fn disconnect(&mut self, role: Role) {
        self.status = GameStatus::Disconnected;
        self.turn = Some(role.opponent());
    }

    /// 对局是否已分出结果（获胜或平局）
    pub fn is_concluded(&self) -> bool {
        matches!(self.status, GameStatus::Finished | GameStatus::Tied)
    }

    /// 重置会话：清空棋盘、释放两个座位、回到等待状态
    pub fn reset(&mut self) {
        self.board = Board::empty();
        self.turn = None;
        self.status = GameStatus::Waiting;
        self.seats = [None; SEAT_COUNT];
    }

    /// 为指定接收方生成状态快照
    pub fn snapshot(&self, for_role: Option<Role>) -> StateMessage {
        StateMessage {
            status: self.status,
            turn: self.turn,
            your_role: for_role,
            board: self.board,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
