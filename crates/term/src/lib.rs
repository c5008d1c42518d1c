//! Terminal "game renderer".
//!
//! A small, game-oriented rendering layer: the board and HUD are drawn into a
//! plain framebuffer, which is then diffed and flushed with crossterm. No
//! widget toolkit is involved, so the aspect ratio (2 columns per cell) and
//! colors are under direct control.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use block_drop_core as core;
pub use block_drop_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AdapterStatusView, GameView, HudInfo, Viewport, PALETTE};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
