//! One game session wired to the player's profile.
//!
//! The session owns the engine, its frame clock and the profile. After every
//! call that can change the game it drains engine events; the game-over event
//! pays the coin reward and records the high score exactly once. The result is
//! applied in memory first and then saved; a failed save is retried on the next
//! settle.

use std::time::Instant;

use anyhow::Result;
use block_drop_core::snapshot::GameSnapshot;
use block_drop_core::types::{
    GameAction, GameOverEvent, LinesClearedEvent, LockEvent, GAME_ID,
};
use block_drop_core::{GameObserver, GameState, PieceSource, UniformSource};

use crate::clock::GameClock;
use crate::profile::Profile;
use crate::store::KeyValueStore;

/// Collects what the session must act on from one batch of engine events.
#[derive(Debug, Default)]
struct EventTally {
    locks: u32,
    lines: u32,
    game_over: Option<GameOverEvent>,
}

impl GameObserver for EventTally {
    fn on_lock(&mut self, _event: &LockEvent) {
        self.locks += 1;
    }

    fn on_lines_cleared(&mut self, event: &LinesClearedEvent) {
        self.lines += event.count;
        log::debug!(
            "cleared {} line(s) for {} points, interval now {}ms",
            event.count,
            event.score_delta,
            event.drop_interval_ms
        );
    }

    fn on_game_over(&mut self, event: &GameOverEvent) {
        self.game_over = Some(*event);
    }
}

/// Result of the last finished game, for the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub final_score: u32,
    pub lines: u32,
    pub coin_reward: u32,
    pub new_high_score: bool,
}

pub struct Session<S, P = UniformSource> {
    game: GameState<P>,
    profile: Profile<S>,
    clock: GameClock,
    tally: EventTally,
    last_result: Option<GameResult>,
    unsaved: bool,
}

impl<S: KeyValueStore, P: PieceSource> Session<S, P> {
    pub fn new(game: GameState<P>, profile: Profile<S>) -> Self {
        Self {
            game,
            profile,
            clock: GameClock::new(),
            tally: EventTally::default(),
            last_result: None,
            unsaved: false,
        }
    }

    /// Count the game as played, spawn the first piece and start the clock.
    pub fn start(&mut self, now: Instant) -> Result<()> {
        self.profile.record_game_played()?;
        self.game.start();
        self.clock.start(now);
        log::info!("session started (episode {})", self.game.episode_id());
        self.settle()
    }

    pub fn game(&self) -> &GameState<P> {
        &self.game
    }

    pub fn profile(&self) -> &Profile<S> {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut Profile<S> {
        &mut self.profile
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn last_result(&self) -> Option<GameResult> {
        self.last_result
    }

    pub fn best_score(&self) -> u32 {
        self.profile.high_score(GAME_ID)
    }

    pub fn coins(&self) -> u32 {
        self.profile.coins()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.game.snapshot_into(out);
    }

    /// Apply one player action, then settle events.
    pub fn apply_action(&mut self, action: GameAction, now: Instant) -> Result<bool> {
        if action == GameAction::Restart {
            self.restart(now)?;
            return Ok(true);
        }
        let applied = self.game.apply_action(action);
        self.settle()?;
        Ok(applied)
    }

    /// Feed elapsed wall time to gravity. Returns whether a drop step ran.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        let Some(elapsed) = self.clock.elapsed_since_last(now) else {
            return Ok(false);
        };
        let stepped = self.game.tick(elapsed);
        self.settle()?;
        Ok(stepped)
    }

    /// Throw away the current game and start a new one.
    pub fn restart(&mut self, now: Instant) -> Result<()> {
        self.game.restart();
        self.clock.start(now);
        self.last_result = None;
        log::info!("session restarted (episode {})", self.game.episode_id());
        self.settle()
    }

    /// Stop the clock; the game stays inspectable.
    pub fn stop(&mut self) {
        self.clock.stop();
    }

    fn settle(&mut self) -> Result<()> {
        self.game.dispatch_events(&mut self.tally);
        if let Some(over) = self.tally.game_over.take() {
            self.finish(over);
        }
        if self.unsaved {
            self.profile.save()?;
            self.unsaved = false;
        }
        Ok(())
    }

    fn finish(&mut self, over: GameOverEvent) {
        self.clock.stop();
        let new_high_score = self
            .profile
            .apply_game_result(GAME_ID, over.final_score, over.coin_reward);
        self.unsaved = true;

        log::info!(
            "game over: score {}, lines {}, +{} coins (locks {}, lines seen {})",
            over.final_score,
            over.lines,
            over.coin_reward,
            self.tally.locks,
            self.tally.lines
        );
        self.tally = EventTally::default();
        self.last_result = Some(GameResult {
            final_score: over.final_score,
            lines: over.lines,
            coin_reward: over.coin_reward,
            new_high_score,
        });
    }
}
