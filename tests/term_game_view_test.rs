use block_drop::core::{GameState, ScriptedSource};
use block_drop::term::{AdapterStatusView, FrameBuffer, GameView, HudInfo, Viewport, PALETTE};
use block_drop::types::PieceKind;

fn screen_text(fb: &FrameBuffer) -> String {
    let mut all = String::new();
    for y in 0..fb.height() {
        all.push_str(&fb.row_text(y));
        all.push('\n');
    }
    all
}

#[test]
fn term_view_renders_border_corners() {
    let snap = GameState::new(1).snapshot();
    let view = GameView::default();

    // 10 cells * 2 columns + border => 22 wide; 20 rows + border => 22 tall.
    let fb = view.render(&snap, &HudInfo::default(), Viewport::new(22, 22));

    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(21, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 21).unwrap().ch, '└');
    assert_eq!(fb.get(21, 21).unwrap().ch, '┘');
}

#[test]
fn term_view_renders_locked_cell_as_two_chars_wide() {
    let mut snap = GameState::new(1).snapshot();
    snap.board[19][0] = PieceKind::I.color_index();

    let fb = GameView::default().render(&snap, &HudInfo::default(), Viewport::new(22, 22));

    let cell = fb.get(1, 20).unwrap();
    assert_eq!(cell.ch, '█');
    assert_eq!(cell.style.fg, PALETTE[0]);
    assert_eq!(fb.get(2, 20).unwrap().ch, '█');
    assert_ne!(fb.get(3, 20).unwrap().ch, '█');
}

#[test]
fn term_view_draws_active_piece_and_ghost() {
    let mut game = GameState::with_source(ScriptedSource::repeat(PieceKind::O));
    game.start();
    let snap = game.snapshot();

    let fb = GameView::default().render(&snap, &HudInfo::default(), Viewport::new(22, 22));

    // O spawns at columns 4-5, rows 0-1; its ghost rests on rows 18-19.
    assert_eq!(fb.get(1 + 4 * 2, 1).unwrap().ch, '█');
    assert_eq!(fb.get(1 + 5 * 2 + 1, 2).unwrap().ch, '█');
    assert_eq!(fb.get(1 + 4 * 2, 1 + 18).unwrap().ch, '░');
    assert_eq!(fb.get(1 + 5 * 2, 1 + 19).unwrap().ch, '░');
}

#[test]
fn term_view_side_panel_shows_score_and_wallet() {
    let mut game = GameState::new(7);
    game.start();
    let snap = game.snapshot();
    let hud = HudInfo {
        best_score: 4200,
        coins: 135,
        last_reward: None,
        adapter: None,
    };

    let fb = GameView::default().render(&snap, &hud, Viewport::new(60, 22));
    let all = screen_text(&fb);

    for label in ["SCORE", "LINES", "SPEED", "BEST", "COINS", "AI"] {
        assert!(all.contains(label), "missing {}", label);
    }
    assert!(all.contains("4200"));
    assert!(all.contains("135"));
    assert!(all.contains("1000ms"));
    assert!(all.contains("OFF"));
}

#[test]
fn term_view_side_panel_shows_adapter_status() {
    let snap = GameState::new(1).snapshot();
    let hud = HudInfo {
        adapter: Some(AdapterStatusView {
            client_count: 3,
            has_controller: true,
        }),
        ..HudInfo::default()
    };

    let fb = GameView::default().render(&snap, &hud, Viewport::new(60, 22));
    let all = screen_text(&fb);
    assert!(all.contains("CTRL"));
    assert!(all.contains("C 3"));
}

#[test]
fn term_view_hides_side_panel_on_narrow_viewports() {
    let snap = GameState::new(1).snapshot();
    let fb = GameView::default().render(&snap, &HudInfo::default(), Viewport::new(30, 22));
    assert!(!screen_text(&fb).contains("SCORE"));
}

#[test]
fn term_view_centers_board_on_tall_viewports() {
    let snap = GameState::new(1).snapshot();
    let fb = GameView::default().render(&snap, &HudInfo::default(), Viewport::new(22, 30));

    // start_y = (30 - 22) / 2 = 4
    assert_eq!(fb.get(0, 4).unwrap().ch, '┌');
}

#[test]
fn term_view_game_over_overlay_shows_score_and_reward() {
    let mut snap = GameState::new(1).snapshot();
    snap.started = true;
    snap.game_over = true;
    snap.score = 900;
    let hud = HudInfo {
        last_reward: Some(80),
        ..HudInfo::default()
    };

    let fb = GameView::default().render(&snap, &hud, Viewport::new(22, 22));
    let all = screen_text(&fb);
    assert!(all.contains("GAME OVER"));
    assert!(all.contains("Score: 900"));
    assert!(all.contains("+80 coins"));
}

#[test]
fn term_view_game_over_overlay_without_reward_line() {
    let mut snap = GameState::new(1).snapshot();
    snap.started = true;
    snap.game_over = true;

    let fb = GameView::default().render(&snap, &HudInfo::default(), Viewport::new(22, 22));
    let all = screen_text(&fb);
    assert!(all.contains("GAME OVER"));
    assert!(!all.contains("coins"));
}
