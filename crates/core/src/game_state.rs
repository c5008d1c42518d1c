//! Game state module - the block-drop engine
//!
//! This module ties together the board, shapes, piece source and scoring.
//! It handles the spawn → fall → lock → clear cycle, gravity timing and the
//! game lifecycle. Invalid operations are silently rejected (`false` / no-op);
//! game over is terminal for the session.

use crate::events::{dispatch, GameObserver};
use crate::rng::{PieceSource, UniformSource};
use crate::scoring::{coin_reward, drop_interval_ms, line_clear_score};
use crate::shapes::{spawn_col, Shape};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::*;
use crate::Board;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    /// Current (possibly rotated) matrix.
    pub shape: Shape,
    /// Column of the matrix's top-left corner.
    pub col: i8,
    /// Row of the matrix's top-left corner.
    pub row: i8,
}

impl ActivePiece {
    /// Create a new piece centered at the top of the board
    pub fn spawn(kind: PieceKind) -> Self {
        let shape = Shape::template(kind);
        Self {
            kind,
            shape,
            col: spawn_col(&shape, BOARD_WIDTH),
            row: 0,
        }
    }

    pub fn color_index(&self) -> u8 {
        self.kind.color_index()
    }

    /// Check if all cells are at valid positions on the board
    pub fn fits(&self, board: &Board) -> bool {
        board.fits(&self.shape, self.col, self.row)
    }

    /// Absolute (col, row) board coordinates of the piece's cells.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape
            .cells()
            .map(move |(dc, dr)| (self.col + dc, self.row + dr))
    }
}

/// Complete game state
///
/// Generic over the piece source so tests can script exact spawn sequences.
#[derive(Debug, Clone)]
pub struct GameState<S = UniformSource> {
    board: Board,
    active: Option<ActivePiece>,
    source: S,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    /// Monotonic id for spawned pieces (increments only on successful spawn).
    piece_id: u32,
    /// Events not yet drained by the host.
    events: Vec<EngineEvent>,
    score: u32,
    lines: u32,
    drop_interval_ms: u32,
    drop_timer_ms: u32,
    game_over: bool,
    started: bool,
}

impl GameState<UniformSource> {
    /// Create a new game drawing pieces uniformly from a seeded RNG
    pub fn new(seed: u32) -> Self {
        Self::with_source(UniformSource::new(seed))
    }
}

impl<S: PieceSource> GameState<S> {
    /// Create a new game on an empty board
    pub fn with_source(source: S) -> Self {
        Self::with_board(Board::new(), source)
    }

    /// Create a new game on a pre-filled board (puzzles, tests).
    pub fn with_board(board: Board, source: S) -> Self {
        Self {
            board,
            active: None,
            source,
            episode_id: 0,
            piece_id: 0,
            events: Vec::with_capacity(4),
            score: 0,
            lines: 0,
            drop_interval_ms: drop_interval_ms(0),
            drop_timer_ms: 0,
            game_over: false,
            started: false,
        }
    }

    /// Start the game and spawn the first piece
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.spawn_piece();
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Started and not over: input and gravity have an effect.
    pub fn is_playing(&self) -> bool {
        self.started && !self.game_over
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval_ms
    }

    pub fn drop_timer_ms(&self) -> u32 {
        self.drop_timer_ms
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    #[cfg(test)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_u8_grid(&mut out.board);

        out.active = self.active.map(ActiveSnapshot::from);
        out.ghost_row = self.ghost_row();
        out.started = self.started;
        out.game_over = self.game_over;
        out.episode_id = self.episode_id;
        out.piece_id = self.piece_id;
        out.score = self.score;
        out.lines = self.lines;
        out.drop_interval_ms = self.drop_interval_ms;
        out.drop_timer_ms = self.drop_timer_ms;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Spawn a new piece from the source.
    ///
    /// Returns false (and ends the game) when the spawn position collides.
    pub fn spawn_piece(&mut self) -> bool {
        if self.game_over {
            return false;
        }

        let piece = ActivePiece::spawn(self.source.next_kind());
        if !piece.fits(&self.board) {
            self.active = None;
            self.game_over = true;
            self.events.push(EngineEvent::GameOver(GameOverEvent {
                final_score: self.score,
                lines: self.lines,
                coin_reward: coin_reward(self.score),
            }));
            return false;
        }

        self.active = Some(piece);
        self.piece_id = self.piece_id.wrapping_add(1);
        true
    }

    /// Try to move the active piece by (d_col, d_row).
    ///
    /// A blocked downward move locks the piece (and spawns the next one).
    /// A blocked sideways move has no effect.
    pub fn try_move(&mut self, d_col: i8, d_row: i8) -> bool {
        if self.game_over {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let col = active.col + d_col;
        let row = active.row + d_row;
        if self.board.fits(&active.shape, col, row) {
            self.active = Some(ActivePiece { col, row, ..active });
            return true;
        }

        if d_row > 0 {
            self.lock_piece();
        }
        false
    }

    /// Rotate the active piece 90° clockwise in place (no wall kicks).
    pub fn rotate(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let rotated = active.shape.rotate_cw();
        if !self.board.fits(&rotated, active.col, active.row) {
            return false;
        }

        self.active = Some(ActivePiece {
            shape: rotated,
            ..active
        });
        true
    }

    /// Drop the active piece to its resting position and lock it.
    ///
    /// Returns the number of rows the piece fell.
    pub fn hard_drop(&mut self) -> u32 {
        if self.game_over || self.active.is_none() {
            return 0;
        }

        let mut rows = 0;
        while self.try_move(0, 1) {
            rows += 1;
        }
        rows
    }

    /// Lock the active piece onto the board, clear lines and spawn the next piece
    pub fn lock_piece(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        self.board
            .lock_shape(&active.shape, active.col, active.row, active.kind);
        self.events.push(EngineEvent::Locked(LockEvent {
            kind: active.kind,
            col: active.col,
            row: active.row,
            piece_id: self.piece_id,
        }));

        let cleared = self.board.clear_full_rows().len() as u32;
        if cleared > 0 {
            let score_delta = line_clear_score(cleared);
            self.score = self.score.saturating_add(score_delta);
            self.lines = self.lines.saturating_add(cleared);
            self.drop_interval_ms = drop_interval_ms(self.lines);

            self.events.push(EngineEvent::LinesCleared(LinesClearedEvent {
                count: cleared,
                score_delta,
                total_lines: self.lines,
                drop_interval_ms: self.drop_interval_ms,
            }));
        }

        self.spawn_piece();
    }

    /// Row the active piece would rest on after a hard drop.
    pub fn ghost_row(&self) -> Option<i8> {
        let active = self.active?;
        let mut row = active.row;
        while self.board.fits(&active.shape, active.col, row + 1) {
            row += 1;
        }
        Some(row)
    }

    /// Advance gravity by `elapsed_ms`.
    ///
    /// Once the accumulated time exceeds the drop interval, the piece moves
    /// down one row (or locks) and the accumulator restarts from zero.
    /// Returns true when a gravity step happened.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.is_playing() {
            return false;
        }

        self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);
        if self.drop_timer_ms <= self.drop_interval_ms {
            return false;
        }

        self.drop_timer_ms = 0;
        self.try_move(0, 1);
        true
    }

    /// Apply a game action
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.try_move(-1, 0),
            GameAction::MoveRight => self.try_move(1, 0),
            GameAction::SoftDrop => {
                if !self.is_playing() {
                    return false;
                }
                self.try_move(0, 1);
                true
            }
            GameAction::Rotate => self.rotate(),
            GameAction::HardDrop => {
                if !self.is_playing() {
                    return false;
                }
                self.hard_drop();
                true
            }
            GameAction::Restart => {
                self.restart();
                true
            }
        }
    }

    /// Discard the session and start a new one with the same piece source.
    ///
    /// Undrained events from the old session are kept.
    pub fn restart(&mut self) {
        self.board.clear();
        self.active = None;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.piece_id = 0;
        self.score = 0;
        self.lines = 0;
        self.drop_interval_ms = drop_interval_ms(0);
        self.drop_timer_ms = 0;
        self.game_over = false;
        self.started = false;
        self.start();
    }

    /// Whether events are waiting to be drained.
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Drain queued events in the order they happened.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, EngineEvent> {
        self.events.drain(..)
    }

    /// Take all queued events, leaving the queue empty.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain queued events into an observer.
    pub fn dispatch_events<O: GameObserver + ?Sized>(&mut self, observer: &mut O) {
        for event in self.events.drain(..) {
            dispatch(&event, observer);
        }
    }
}

impl Default for GameState<UniformSource> {
    fn default() -> Self {
        Self::new(1)
    }
}
