//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (engine, host, terminal rendering, remote protocol).
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn column**: `(BOARD_WIDTH - shape_width) / 2`, row 0
//!
//! # Timing and Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Host frame interval (~60 FPS) |
//! | `BASE_DROP_MS` | 1000 | Drop interval with no cleared lines |
//! | `DROP_INTERVAL_STEP_MS` | 20 | Interval reduction per cleared line |
//! | `DROP_INTERVAL_MIN_MS` | 100 | Interval floor |
//! | `LINE_CLEAR_BASE_POINTS` | 100 | Multiplied by `k²` for `k` lines in one lock |
//! | `COIN_REWARD_SCORE_STEP` | 200 | Score needed per coin payout step |
//! | `COIN_REWARD_PER_STEP` | 20 | Coins per payout step |
//!
//! # Examples
//!
//! ```
//! use block_drop_types::{GameAction, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let piece = PieceKind::T;
//! assert_eq!(piece.color_index(), 3);
//! assert_eq!(PieceKind::from_color_index(3), Some(PieceKind::T));
//!
//! let action = GameAction::from_str("hardDrop").unwrap();
//! assert_eq!(action, GameAction::HardDrop);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Host frame interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Drop interval before any line is cleared (1000ms = 1 second per row)
pub const BASE_DROP_MS: u32 = 1000;

/// Drop interval reduction per cleared line
pub const DROP_INTERVAL_STEP_MS: u32 = 20;

/// Absolute minimum drop interval (100ms)
pub const DROP_INTERVAL_MIN_MS: u32 = 100;

/// Points for a line clear are `LINE_CLEAR_BASE_POINTS * k * k`
pub const LINE_CLEAR_BASE_POINTS: u32 = 100;

/// Score needed per coin payout step at game over
pub const COIN_REWARD_SCORE_STEP: u32 = 200;

/// Coins paid per full score step at game over
pub const COIN_REWARD_PER_STEP: u32 = 20;

/// Identifier under which this game's high score is stored by the host
pub const GAME_ID: &str = "tetris";


/// The seven tetromino piece kinds
///
/// The declaration order is the template order; each kind's color index is
/// its position plus one:
/// - **I** (1): cyan, horizontal bar
/// - **O** (2): yellow, 2x2 square
/// - **T** (3): purple
/// - **L** (4): orange
/// - **J** (5): blue
/// - **S** (6): green
/// - **Z** (7): red
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    /// All kinds in template order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Board color index (1..=7). Zero is reserved for empty cells.
    pub fn color_index(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::L => 4,
            PieceKind::J => 5,
            PieceKind::S => 6,
            PieceKind::Z => 7,
        }
    }

    /// Inverse of [`PieceKind::color_index`].
    pub fn from_color_index(index: u8) -> Option<Self> {
        match index {
            1..=7 => Some(Self::ALL[(index - 1) as usize]),
            _ => None,
        }
    }

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use block_drop_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "l" => Some(PieceKind::L),
            "j" => Some(PieceKind::J),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::L => "l",
            PieceKind::J => "j",
            PieceKind::S => "s",
            PieceKind::Z => "z",
        }
    }
}

/// Game actions that can be applied to modify game state
///
/// These actions are used by keyboard input and by remote controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down (locks when blocked)
    SoftDrop,
    /// Rotate piece 90° clockwise, no wall kicks
    Rotate,
    /// Drop piece to its resting position and lock it
    HardDrop,
    /// Throw the current session away and start a new one
    Restart,
}

impl GameAction {
    pub const ALL: [GameAction; 6] = [
        GameAction::MoveLeft,
        GameAction::MoveRight,
        GameAction::SoftDrop,
        GameAction::Rotate,
        GameAction::HardDrop,
        GameAction::Restart,
    ];

    /// Parse action from string (for the remote protocol)
    ///
    /// # Examples
    ///
    /// ```
    /// use block_drop_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("rotate"), Some(GameAction::Rotate));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "rotate" => Some(GameAction::Rotate),
            "harddrop" => Some(GameAction::HardDrop),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string for the remote protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::Rotate => "rotate",
            GameAction::HardDrop => "hardDrop",
            GameAction::Restart => "restart",
        }
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Cell filled by a locked piece of that kind
pub type Cell = Option<PieceKind>;

/// Emitted when the falling piece becomes board content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub kind: PieceKind,
    /// Top-left column of the piece's shape matrix at lock time.
    pub col: i8,
    /// Top-left row of the piece's shape matrix at lock time.
    pub row: i8,
    pub piece_id: u32,
}

/// Emitted after a lock that cleared at least one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinesClearedEvent {
    /// Rows removed by this lock.
    pub count: u32,
    /// Points added by this lock (`100 * count²`).
    pub score_delta: u32,
    pub total_lines: u32,
    /// Drop interval after the clear.
    pub drop_interval_ms: u32,
}

/// Emitted exactly once per session, when a spawn collides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverEvent {
    pub final_score: u32,
    pub lines: u32,
    /// Coins owed to the player: `floor(score / 200) * 20`.
    pub coin_reward: u32,
}

/// Outbound engine event, drained by the host after each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Locked(LockEvent),
    LinesCleared(LinesClearedEvent),
    GameOver(GameOverEvent),
}
