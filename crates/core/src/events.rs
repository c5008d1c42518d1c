//! Outbound engine events and the observer hook hosts implement.
//!
//! The engine queues events as they happen; a host drains the queue after each
//! call and either matches on [`EngineEvent`] directly or hands the queue to a
//! [`GameObserver`].

use crate::types::{EngineEvent, GameOverEvent, LinesClearedEvent, LockEvent};

/// Host-side subscriber. Every method defaults to a no-op.
pub trait GameObserver {
    fn on_lock(&mut self, _event: &LockEvent) {}

    fn on_lines_cleared(&mut self, _event: &LinesClearedEvent) {}

    fn on_game_over(&mut self, _event: &GameOverEvent) {}
}

/// Route one event to the matching observer method.
pub fn dispatch<O: GameObserver + ?Sized>(event: &EngineEvent, observer: &mut O) {
    match event {
        EngineEvent::Locked(ev) => observer.on_lock(ev),
        EngineEvent::LinesCleared(ev) => observer.on_lines_cleared(ev),
        EngineEvent::GameOver(ev) => observer.on_game_over(ev),
    }
}
