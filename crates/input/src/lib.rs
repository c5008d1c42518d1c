//! Terminal input (engine-facing).
//!
//! Maps `crossterm` key events to [`GameAction`](types::GameAction)s. Each
//! press or auto-repeat produces one action; there is no client-side
//! repeat timing.

pub mod map;

pub use block_drop_types as types;

pub use map::{handle_key_event, should_quit, translate_event, InputCommand};

use std::io;
use std::time::Duration;

use crossterm::event;

/// Read every event already queued by the terminal without blocking.
pub fn drain_pending(out: &mut Vec<InputCommand>) -> io::Result<()> {
    while event::poll(Duration::ZERO)? {
        if let Some(cmd) = translate_event(&event::read()?) {
            out.push(cmd);
        }
    }
    Ok(())
}
