use crate::game_state::ActivePiece;
use crate::shapes::Shape;
use crate::types::{PieceKind, BASE_DROP_MS, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub shape: Shape,
    pub col: i8,
    pub row: i8,
}

impl ActiveSnapshot {
    pub fn color_index(&self) -> u8 {
        self.kind.color_index()
    }

    /// Absolute (col, row) board coordinates of the piece's cells.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape
            .cells()
            .map(move |(dc, dr)| (self.col + dc, self.row + dr))
    }
}

impl From<ActivePiece> for ActiveSnapshot {
    fn from(value: ActivePiece) -> Self {
        Self {
            kind: value.kind,
            shape: value.shape,
            col: value.col,
            row: value.row,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    /// Color indices, 0 = empty.
    pub board: [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub active: Option<ActiveSnapshot>,
    pub ghost_row: Option<i8>,
    pub started: bool,
    pub game_over: bool,
    pub episode_id: u32,
    pub piece_id: u32,
    pub score: u32,
    pub lines: u32,
    pub drop_interval_ms: u32,
    pub drop_timer_ms: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.board = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        self.active = None;
        self.ghost_row = None;
        self.started = false;
        self.game_over = false;
        self.episode_id = 0;
        self.piece_id = 0;
        self.score = 0;
        self.lines = 0;
        self.drop_interval_ms = BASE_DROP_MS;
        self.drop_timer_ms = 0;
    }

    pub fn playable(&self) -> bool {
        self.started && !self.game_over
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            board: [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            active: None,
            ghost_row: None,
            started: false,
            game_over: false,
            episode_id: 0,
            piece_id: 0,
            score: 0,
            lines: 0,
            drop_interval_ms: 0,
            drop_timer_ms: 0,
        };
        s.clear();
        s
    }
}
