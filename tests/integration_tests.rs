//! Integration tests for complete game flows

use block_drop::core::{Board, GameObserver, GameState, ScriptedSource};
use block_drop::types::{
    EngineEvent, GameAction, GameOverEvent, LinesClearedEvent, LockEvent, PieceKind,
    BOARD_WIDTH,
};

fn scripted(kinds: &[PieceKind]) -> GameState<ScriptedSource> {
    GameState::with_source(ScriptedSource::new(kinds.to_vec()))
}

#[test]
fn test_o_hard_drop_lands_on_floor_centered() {
    let mut game = scripted(&[PieceKind::O]);
    game.start();
    assert_eq!(game.piece_id(), 1);

    let fell = game.hard_drop();
    assert_eq!(fell, 18);

    let board = game.board();
    for (col, row) in [(4, 18), (5, 18), (4, 19), (5, 19)] {
        assert_eq!(board.get(col, row), Some(Some(PieceKind::O)));
    }
    assert_eq!(board.filled_count(), 4);
    assert_eq!(game.score(), 0);
    assert_eq!(game.piece_id(), 2);

    let events = game.take_events();
    assert_eq!(
        events,
        vec![EngineEvent::Locked(LockEvent {
            kind: PieceKind::O,
            col: 4,
            row: 18,
            piece_id: 1,
        })]
    );
}

#[test]
fn test_vertical_i_fills_gap_and_clears_row() {
    let mut board = Board::new();
    for col in 1..BOARD_WIDTH as i8 {
        board.set(col, 19, Some(PieceKind::Z));
    }
    board.set(5, 18, Some(PieceKind::T));

    let mut game = GameState::with_board(board, ScriptedSource::repeat(PieceKind::I));
    game.start();

    assert!(game.rotate());
    for _ in 0..3 {
        assert!(game.try_move(-1, 0));
    }
    assert!(!game.try_move(-1, 0), "left wall blocks");
    assert_eq!(game.active().map(|p| p.col), Some(0));

    game.apply_action(GameAction::HardDrop);

    assert_eq!(game.score(), 100);
    assert_eq!(game.lines(), 1);
    assert_eq!(game.drop_interval_ms(), 980);

    let board = game.board();
    // Rows above the cleared row moved down by one.
    for row in 17..20 {
        assert_eq!(board.get(0, row), Some(Some(PieceKind::I)), "row {}", row);
    }
    assert_eq!(board.get(0, 16), Some(None));
    assert_eq!(board.get(5, 19), Some(Some(PieceKind::T)));
    assert_eq!(board.filled_count(), 4);

    let events = game.take_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], EngineEvent::Locked(LockEvent { kind: PieceKind::I, col: 0, row: 16, .. })));
    assert_eq!(
        events[1],
        EngineEvent::LinesCleared(LinesClearedEvent {
            count: 1,
            score_delta: 100,
            total_lines: 1,
            drop_interval_ms: 980,
        })
    );
    assert!(game.is_playing());
}

#[test]
fn test_blocked_spawn_ends_game_and_freezes_board() {
    let mut board = Board::new();
    board.set(4, 0, Some(PieceKind::J));
    let mut game = GameState::with_board(board, ScriptedSource::repeat(PieceKind::O));
    game.start();

    assert!(game.started());
    assert!(game.game_over());
    assert!(!game.is_playing());
    assert!(game.active().is_none());
    assert_eq!(game.piece_id(), 0);
    assert_eq!(
        game.take_events(),
        vec![EngineEvent::GameOver(GameOverEvent {
            final_score: 0,
            lines: 0,
            coin_reward: 0,
        })]
    );

    let before = game.board().clone();
    assert!(!game.try_move(-1, 0));
    assert!(!game.try_move(0, 1));
    assert!(!game.rotate());
    assert_eq!(game.hard_drop(), 0);
    assert!(!game.apply_action(GameAction::SoftDrop));
    assert!(!game.tick(5_000));
    assert_eq!(game.board(), &before);
    assert!(!game.has_events());
}

#[test]
fn test_gravity_steps_only_after_interval_is_exceeded() {
    let mut game = scripted(&[PieceKind::T]);
    game.start();

    assert!(!game.tick(1000));
    assert_eq!(game.active().map(|p| p.row), Some(0));
    assert_eq!(game.drop_timer_ms(), 1000);

    assert!(game.tick(1));
    assert_eq!(game.active().map(|p| p.row), Some(1));
    assert_eq!(game.drop_timer_ms(), 0);
}

#[test]
fn test_soft_drop_on_floor_locks_and_spawns_next() {
    let mut game = scripted(&[PieceKind::O, PieceKind::I]);
    game.start();
    while game.try_move(0, 1) {}

    // The failed move above locked the O and spawned the I.
    assert_eq!(game.active().map(|p| p.kind), Some(PieceKind::I));
    assert_eq!(game.piece_id(), 2);
    assert_eq!(game.board().filled_count(), 4);
}

#[test]
fn test_stacking_until_top_out() {
    let mut game = scripted(&[PieceKind::O]);
    game.start();

    let mut drops = 0;
    while game.is_playing() {
        game.hard_drop();
        drops += 1;
        assert!(drops <= 10, "should top out within 10 drops");
    }

    // Ten 2-high pieces fill columns 4 and 5 exactly.
    assert_eq!(drops, 10);
    assert_eq!(game.board().filled_count(), 40);
    let events = game.take_events();
    assert_eq!(events.iter().filter(|e| matches!(e, EngineEvent::Locked(_))).count(), 10);
    assert!(matches!(events.last(), Some(EngineEvent::GameOver(_))));
}

#[test]
fn test_restart_starts_new_episode() {
    let mut game = scripted(&[PieceKind::O]);
    game.start();
    game.hard_drop();
    game.hard_drop();
    assert_eq!(game.episode_id(), 0);

    assert!(game.apply_action(GameAction::Restart));
    assert_eq!(game.episode_id(), 1);
    assert_eq!(game.piece_id(), 1);
    assert_eq!(game.board().filled_count(), 0);
    assert_eq!(game.score(), 0);
    assert_eq!(game.drop_interval_ms(), 1000);
    assert!(game.is_playing());
}

#[test]
fn test_snapshot_reflects_state() {
    let mut game = scripted(&[PieceKind::O]);
    let idle = game.snapshot();
    assert!(!idle.playable());
    assert!(idle.active.is_none());

    game.start();
    game.hard_drop();
    let snap = game.snapshot();
    assert!(snap.playable());
    assert_eq!(snap.board[19][4], PieceKind::O.color_index());
    assert_eq!(snap.piece_id, 2);
    assert_eq!(snap.ghost_row, Some(16));
    let active = snap.active.expect("next piece spawned");
    assert_eq!((active.col, active.row), (4, 0));
}

#[derive(Default)]
struct Recorder {
    locks: Vec<u32>,
    overs: Vec<GameOverEvent>,
}

impl GameObserver for Recorder {
    fn on_lock(&mut self, event: &LockEvent) {
        self.locks.push(event.piece_id);
    }

    fn on_game_over(&mut self, event: &GameOverEvent) {
        self.overs.push(*event);
    }
}

#[test]
fn test_observer_receives_events_in_order() {
    let mut game = scripted(&[PieceKind::O]);
    game.start();
    while game.is_playing() {
        game.hard_drop();
    }

    let mut rec = Recorder::default();
    game.dispatch_events(&mut rec);
    assert_eq!(rec.locks, (1..=10).collect::<Vec<_>>());
    assert_eq!(rec.overs.len(), 1);
    assert!(!game.has_events());
}
