//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the block-drop rules, state management and gravity
//! timing. It has no dependency on terminal, storage or networking code; the
//! host drives it through [`GameState::apply_action`] and [`GameState::tick`]
//! and drains [`EngineEvent`](types::EngineEvent)s afterwards.
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid with collision checks and row clearing
//! - [`shapes`]: the seven shape matrices and clockwise rotation
//! - [`game_state`]: active piece, lock/clear/spawn cycle, scoring and timing
//! - [`rng`]: injectable piece sources (seeded uniform, scripted)
//! - [`scoring`]: line clear points, drop interval and coin payout
//! - [`events`]: observer hook for engine events
//! - [`snapshot`]: render/observation view of the state
//!
//! # Rules
//!
//! - Pieces spawn centered at row 0; a blocked spawn ends the game
//! - Rotation is clockwise only with no wall kicks
//! - A blocked downward move locks the piece immediately (no lock delay)
//! - `k` rows cleared by one lock score `100 * k * k`
//! - The drop interval is `max(100, 1000 - 20 * lines)` milliseconds
//!
//! # Example
//!
//! ```
//! use block_drop_core::GameState;
//! use block_drop_types::GameAction;
//!
//! let mut game = GameState::new(12345);
//! game.start();
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::Rotate);
//! game.apply_action(GameAction::HardDrop);
//!
//! // One piece locked, the next one spawned.
//! assert_eq!(game.piece_id(), 2);
//! assert_eq!(game.board().filled_count(), 4);
//! ```

pub mod board;
pub mod events;
pub mod game_state;
pub mod rng;
pub mod scoring;
pub mod shapes;
pub mod snapshot;

pub use block_drop_types as types;

pub use board::Board;
pub use events::{dispatch, GameObserver};
pub use game_state::{ActivePiece, GameState};
pub use rng::{PieceSource, ScriptedSource, SimpleRng, UniformSource};
pub use scoring::{coin_reward, drop_interval_ms, line_clear_score};
pub use shapes::{spawn_col, Shape};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
