//! Host side of the game: persistence, rewards and session timing
//!
//! The engine in `block-drop-core` is pure; everything with side effects lives
//! here:
//!
//! - [`store`]: string key-value storage (in memory or a JSON file)
//! - [`profile`]: the saved player profile, coin wallet and unlocks
//! - [`session`]: one game wired to the profile (reward and high score on game over)
//! - [`clock`]: frame clock feeding `tick`
//! - [`config`]: environment configuration
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//!
//! use block_drop_core::GameState;
//! use block_drop_host::{MemoryStore, Profile, Session};
//! use block_drop_types::GameAction;
//!
//! let profile = Profile::load(MemoryStore::new()).unwrap();
//! let mut session = Session::new(GameState::new(7), profile);
//! let now = Instant::now();
//! session.start(now).unwrap();
//! session.apply_action(GameAction::HardDrop, now).unwrap();
//!
//! assert_eq!(session.profile().data().games_played, 1);
//! ```

pub mod clock;
pub mod config;
pub mod profile;
pub mod session;
pub mod store;

pub use clock::GameClock;
pub use config::HostConfig;
pub use profile::{Profile, SaveData, UnlockOutcome, Wallet, SAVE_KEY};
pub use session::{GameResult, Session};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
