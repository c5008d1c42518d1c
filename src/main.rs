//! Terminal block-drop runner (default binary).
//!
//! Fixed 16 ms frame loop: keyboard input and remote commands are applied
//! between frames, the session clock drives gravity, and the framebuffer
//! renderer draws the board with the player's coins and best score.

use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use block_drop::adapter::{Adapter, InboundPayload};
use block_drop::core::{GameSnapshot, GameState};
use block_drop::host::{HostConfig, JsonFileStore, KeyValueStore, Profile, Session};
use block_drop::input::{drain_pending, InputCommand};
use block_drop::term::{AdapterStatusView, FrameBuffer, GameView, HudInfo, TerminalRenderer, Viewport};
use block_drop::types::TICK_MS;

fn main() -> Result<()> {
    let config = HostConfig::from_env();
    init_logging(config.log_path.as_deref())?;

    let store = JsonFileStore::open(&config.save_path)?;
    let profile = Profile::load(store)?;
    let seed = config.resolve_seed();
    log::info!("block-drop starting (seed {})", seed);

    let mut session = Session::new(GameState::new(seed), profile);
    let mut adapter = match Adapter::start_from_env() {
        Ok(adapter) => adapter,
        Err(e) => {
            log::warn!("remote control unavailable: {:#}", e);
            None
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut session, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    session.stop();
    result
}

/// Log to `path` when given; otherwise stay silent, since stderr would
/// scribble over the raw-mode screen.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run<S: KeyValueStore>(
    term: &mut TerminalRenderer,
    session: &mut Session<S>,
    mut adapter: Option<&mut Adapter>,
) -> Result<()> {
    let view = GameView::default();
    let frame = Duration::from_millis(TICK_MS as u64);

    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = GameSnapshot::default();
    let mut last_broadcast: Option<GameSnapshot> = None;
    let mut inputs = Vec::with_capacity(16);

    session.start(Instant::now())?;

    loop {
        let frame_start = Instant::now();

        inputs.clear();
        drain_pending(&mut inputs)?;
        for cmd in inputs.drain(..) {
            match cmd {
                InputCommand::Quit => return Ok(()),
                InputCommand::Action(action) => {
                    session.apply_action(action, Instant::now())?;
                }
            }
        }

        if let Some(adapter) = adapter.as_deref_mut() {
            while let Some(cmd) = adapter.try_recv() {
                match cmd.payload {
                    InboundPayload::Actions(actions) => {
                        for action in actions.iter() {
                            session.apply_action(action, Instant::now())?;
                        }
                        adapter.send_ack(cmd.client_id, cmd.seq);
                    }
                    InboundPayload::SnapshotRequest => {
                        session.snapshot_into(&mut snap);
                        adapter.send_observation(&snap, Some(cmd.client_id));
                    }
                }
            }
        }

        session.tick(Instant::now())?;
        session.snapshot_into(&mut snap);

        if let Some(adapter) = adapter.as_deref_mut() {
            if last_broadcast.map_or(true, |prev| observable_change(&prev, &snap)) {
                adapter.send_observation(&snap, None);
                last_broadcast = Some(snap);
            }
        }

        let hud = HudInfo {
            best_score: session.best_score(),
            coins: session.coins(),
            last_reward: session.last_result().map(|r| r.coin_reward),
            adapter: adapter.as_deref().map(|a| AdapterStatusView {
                client_count: a.status().client_count().min(u16::MAX as usize) as u16,
                has_controller: a.status().has_controller(),
            }),
        };

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&snap, &hud, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        std::thread::sleep(frame.saturating_sub(frame_start.elapsed()));
    }
}

/// The drop timer moves every frame; anything else changing is worth a broadcast.
fn observable_change(prev: &GameSnapshot, next: &GameSnapshot) -> bool {
    let prev = GameSnapshot {
        drop_timer_ms: next.drop_timer_ms,
        ..*prev
    };
    prev != *next
}
