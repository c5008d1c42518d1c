//! Host session tests - coin payout, high scores and persistence through a save file

use std::path::PathBuf;
use std::time::{Duration, Instant};

use block_drop::core::{Board, GameState, ScriptedSource};
use block_drop::host::{
    JsonFileStore, KeyValueStore, MemoryStore, Profile, SaveData, Session, SAVE_KEY,
};
use block_drop::types::{GameAction, PieceKind, BOARD_WIDTH, GAME_ID};

fn temp_save(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "block-drop-{}-{}.json",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

/// Bottom four rows full except columns 4 and 5: two O drops clear all four.
fn well_board() -> Board {
    let mut board = Board::new();
    for row in 16..20 {
        for col in 0..BOARD_WIDTH as i8 {
            if col != 4 && col != 5 {
                board.set(col, row, Some(PieceKind::L));
            }
        }
    }
    board
}

fn play_to_game_over<S: KeyValueStore>(session: &mut Session<S, ScriptedSource>, now: Instant) {
    for _ in 0..64 {
        if !session.game().is_playing() {
            return;
        }
        session.apply_action(GameAction::HardDrop, now).unwrap();
    }
    panic!("game did not end");
}

#[test]
fn test_game_over_pays_coins_and_persists_profile() {
    let path = temp_save("payout");
    let now = Instant::now();

    {
        let profile = Profile::load(JsonFileStore::open(&path).unwrap()).unwrap();
        let game = GameState::with_board(well_board(), ScriptedSource::repeat(PieceKind::O));
        let mut session = Session::new(game, profile);
        session.start(now).unwrap();

        session.apply_action(GameAction::HardDrop, now).unwrap();
        session.apply_action(GameAction::HardDrop, now).unwrap();
        assert_eq!(session.game().score(), 800);
        assert_eq!(session.game().lines(), 4);
        assert!(session.last_result().is_none());

        play_to_game_over(&mut session, now);

        let result = session.last_result().expect("result after game over");
        assert_eq!(result.final_score, 800);
        assert_eq!(result.lines, 4);
        assert_eq!(result.coin_reward, 80);
        assert!(result.new_high_score);
        assert_eq!(session.coins(), 80);
        assert_eq!(session.best_score(), 800);
        assert!(!session.clock().is_running());
    }

    // A fresh load sees everything the session wrote.
    let profile = Profile::load(JsonFileStore::open(&path).unwrap()).unwrap();
    let data = profile.data();
    assert_eq!(data.coins, 80);
    assert_eq!(data.games_played, 1);
    assert_eq!(data.total_score, 800);
    assert_eq!(data.high_score(GAME_ID), 800);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("highScores"), "{}", raw);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_lower_score_keeps_previous_high_score() {
    let mut store = MemoryStore::new();
    let mut seeded = SaveData::default();
    seeded.high_scores.insert(GAME_ID.to_string(), 5_000);
    seeded.coins = 7;
    store
        .set(SAVE_KEY, &serde_json::to_string(&seeded).unwrap())
        .unwrap();

    let profile = Profile::load(store).unwrap();
    let game = GameState::with_board(well_board(), ScriptedSource::repeat(PieceKind::O));
    let mut session = Session::new(game, profile);
    let now = Instant::now();
    session.start(now).unwrap();
    play_to_game_over(&mut session, now);

    let result = session.last_result().unwrap();
    assert!(!result.new_high_score);
    assert_eq!(session.best_score(), 5_000);
    assert_eq!(session.coins(), 7 + result.coin_reward);
}

#[test]
fn test_zero_score_game_pays_nothing() {
    let profile = Profile::load(MemoryStore::new()).unwrap();
    let game = GameState::with_source(ScriptedSource::repeat(PieceKind::O));
    let mut session = Session::new(game, profile);
    let now = Instant::now();
    session.start(now).unwrap();
    play_to_game_over(&mut session, now);

    let result = session.last_result().unwrap();
    assert_eq!(result.final_score, 0);
    assert_eq!(result.coin_reward, 0);
    assert!(!result.new_high_score);
    assert_eq!(session.coins(), 0);
    assert_eq!(session.best_score(), 0);
}

#[test]
fn test_clock_drives_gravity() {
    let profile = Profile::load(MemoryStore::new()).unwrap();
    let game = GameState::with_source(ScriptedSource::repeat(PieceKind::T));
    let mut session = Session::new(game, profile);
    let t0 = Instant::now();
    session.start(t0).unwrap();

    assert!(!session.tick(t0 + Duration::from_millis(600)).unwrap());
    assert_eq!(session.game().active().map(|p| p.row), Some(0));
    assert!(session.tick(t0 + Duration::from_millis(1_001)).unwrap());
    assert_eq!(session.game().active().map(|p| p.row), Some(1));

    session.stop();
    assert!(!session.tick(t0 + Duration::from_millis(5_000)).unwrap());
    assert_eq!(session.game().active().map(|p| p.row), Some(1));
}

#[test]
fn test_restart_after_game_over_clears_result() {
    let profile = Profile::load(MemoryStore::new()).unwrap();
    let game = GameState::with_source(ScriptedSource::repeat(PieceKind::O));
    let mut session = Session::new(game, profile);
    let now = Instant::now();
    session.start(now).unwrap();
    play_to_game_over(&mut session, now);
    assert!(session.last_result().is_some());

    assert!(session.apply_action(GameAction::Restart, now).unwrap());
    assert!(session.last_result().is_none());
    assert!(session.game().is_playing());
    assert_eq!(session.game().episode_id(), 1);
    assert!(session.clock().is_running());
    assert_eq!(session.profile().data().games_played, 1);
}

#[test]
fn test_partial_save_blob_merges_over_defaults() {
    let mut store = MemoryStore::new();
    store.set(SAVE_KEY, r#"{"coins":50}"#).unwrap();

    let profile = Profile::load(store).unwrap();
    assert_eq!(profile.coins(), 50);
    assert!(profile.data().is_unlocked("tetris"));
    assert_eq!(profile.high_score(GAME_ID), 0);
}
