//! Player profile: coins, play statistics, unlocked games and high scores.
//!
//! The profile is a single JSON blob stored under [`SAVE_KEY`]. Loading merges
//! whatever fields are present over the defaults, so older or partial blobs
//! keep working. Fields this crate does not know about are carried through
//! untouched, since other games share the blob. Every mutation persists
//! immediately; a finished game is folded in with a single save.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::KeyValueStore;

/// Store key holding the serialized [`SaveData`].
pub const SAVE_KEY: &str = "gamehub_data";

/// Games available without spending coins.
pub const DEFAULT_UNLOCKED: [&str; 3] = ["snake", "tetris", "memory"];

/// Persisted player data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveData {
    pub coins: u32,
    pub games_played: u32,
    pub total_score: u64,
    pub unlocked_games: Vec<String>,
    /// Game id → best score.
    pub high_scores: BTreeMap<String, u32>,
    /// Keys written by other games, kept as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            coins: 0,
            games_played: 0,
            total_score: 0,
            unlocked_games: DEFAULT_UNLOCKED.iter().map(|g| g.to_string()).collect(),
            high_scores: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }
}

impl SaveData {
    /// Parse a stored blob, falling back to defaults when it is unreadable.
    pub fn from_json_or_default(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("discarding unreadable save data: {}", err);
                Self::default()
            }
        }
    }

    pub fn high_score(&self, game: &str) -> u32 {
        self.high_scores.get(game).copied().unwrap_or(0)
    }

    pub fn is_unlocked(&self, game: &str) -> bool {
        self.unlocked_games.iter().any(|g| g == game)
    }
}

/// Result of trying to unlock a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked,
    AlreadyUnlocked,
    /// Not enough coins; `needed` more are required.
    InsufficientCoins { needed: u32 },
}

/// Receives coin payouts.
pub trait Wallet {
    fn credit(&mut self, amount: u32) -> Result<()>;

    fn balance(&self) -> u32;
}

/// [`SaveData`] bound to the store it persists through.
#[derive(Debug)]
pub struct Profile<S> {
    data: SaveData,
    store: S,
}

impl<S: KeyValueStore> Profile<S> {
    /// Load the profile from `store`, using defaults for anything missing.
    pub fn load(store: S) -> Result<Self> {
        let data = match store.get(SAVE_KEY).context("failed to read save data")? {
            Some(text) => SaveData::from_json_or_default(&text),
            None => SaveData::default(),
        };

        log::info!(
            "profile loaded: {} coins, {} games played",
            data.coins,
            data.games_played
        );
        Ok(Self { data, store })
    }

    pub fn data(&self) -> &SaveData {
        &self.data
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn coins(&self) -> u32 {
        self.data.coins
    }

    pub fn high_score(&self, game: &str) -> u32 {
        self.data.high_score(game)
    }

    pub fn save(&mut self) -> Result<()> {
        let text = serde_json::to_string(&self.data).context("failed to encode save data")?;
        self.store
            .set(SAVE_KEY, &text)
            .context("failed to write save data")
    }

    /// Add coins. Zero is a no-op and does not touch the store.
    pub fn credit_coins(&mut self, amount: u32) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        self.data.coins = self.data.coins.saturating_add(amount);
        log::info!("+{} coins (balance {})", amount, self.data.coins);
        self.save()
    }

    /// Store `score` as the best for `game` if it beats the current one.
    ///
    /// Returns whether the stored value changed.
    pub fn record_high_score(&mut self, game: &str, score: u32) -> Result<bool> {
        if score <= self.data.high_score(game) {
            return Ok(false);
        }
        self.data.high_scores.insert(game.to_string(), score);
        log::info!("new high score for {}: {}", game, score);
        self.save()?;
        Ok(true)
    }

    /// Fold a finished game into the in-memory data without saving.
    ///
    /// Pays `reward` coins, adds `score` to the running total and keeps it as
    /// the best for `game` if it beats the current one. Returns whether the
    /// best changed. Call [`Profile::save`] afterwards.
    pub fn apply_game_result(&mut self, game: &str, score: u32, reward: u32) -> bool {
        self.data.coins = self.data.coins.saturating_add(reward);
        self.data.total_score = self.data.total_score.saturating_add(score as u64);
        if reward > 0 {
            log::info!("+{} coins (balance {})", reward, self.data.coins);
        }

        if score <= self.data.high_score(game) {
            return false;
        }
        self.data.high_scores.insert(game.to_string(), score);
        log::info!("new high score for {}: {}", game, score);
        true
    }

    pub fn record_game_played(&mut self) -> Result<()> {
        self.data.games_played = self.data.games_played.saturating_add(1);
        self.save()
    }

    pub fn add_total_score(&mut self, score: u32) -> Result<()> {
        if score == 0 {
            return Ok(());
        }
        self.data.total_score = self.data.total_score.saturating_add(score as u64);
        self.save()
    }

    /// Spend `cost` coins to unlock `game`.
    pub fn unlock(&mut self, game: &str, cost: u32) -> Result<UnlockOutcome> {
        if self.data.is_unlocked(game) {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }
        if self.data.coins < cost {
            let needed = cost - self.data.coins;
            log::debug!("cannot unlock {}: need {} more coins", game, needed);
            return Ok(UnlockOutcome::InsufficientCoins { needed });
        }

        self.data.coins -= cost;
        self.data.unlocked_games.push(game.to_string());
        log::info!("unlocked {} for {} coins", game, cost);
        self.save()?;
        Ok(UnlockOutcome::Unlocked)
    }
}

impl<S: KeyValueStore> Wallet for Profile<S> {
    fn credit(&mut self, amount: u32) -> Result<()> {
        self.credit_coins(amount)
    }

    fn balance(&self) -> u32 {
        self.coins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn fresh() -> Profile<MemoryStore> {
        Profile::load(MemoryStore::new()).unwrap()
    }

    fn stored(profile: &Profile<MemoryStore>) -> SaveData {
        let text = profile.store().get(SAVE_KEY).unwrap().unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_defaults_when_store_empty() {
        let profile = fresh();
        assert_eq!(profile.coins(), 0);
        assert_eq!(profile.data().games_played, 0);
        assert!(profile.data().is_unlocked("tetris"));
        assert!(profile.data().is_unlocked("snake"));
        assert!(!profile.data().is_unlocked("pong"));
    }

    #[test]
    fn test_partial_blob_merges_over_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(SAVE_KEY, r#"{"coins":120,"highScores":{"tetris":900}}"#)
            .unwrap();

        let profile = Profile::load(store).unwrap();
        assert_eq!(profile.coins(), 120);
        assert_eq!(profile.high_score("tetris"), 900);
        assert_eq!(profile.data().unlocked_games.len(), 3);
    }

    #[test]
    fn test_corrupt_blob_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(SAVE_KEY, "{{{").unwrap();

        let profile = Profile::load(store).unwrap();
        assert_eq!(profile.data(), &SaveData::default());
    }

    #[test]
    fn test_blob_uses_camel_case_keys() {
        let mut profile = fresh();
        profile.record_game_played().unwrap();
        let text = profile.store().get(SAVE_KEY).unwrap().unwrap();
        assert!(text.contains("\"gamesPlayed\":1"));
        assert!(text.contains("\"unlockedGames\""));
    }

    #[test]
    fn test_credit_zero_is_noop() {
        let mut profile = fresh();
        profile.credit_coins(0).unwrap();
        assert!(profile.store().is_empty());

        profile.credit_coins(40).unwrap();
        assert_eq!(stored(&profile).coins, 40);
    }

    #[test]
    fn test_high_score_only_increases() {
        let mut profile = fresh();
        assert!(profile.record_high_score("tetris", 500).unwrap());
        assert!(!profile.record_high_score("tetris", 300).unwrap());
        assert!(!profile.record_high_score("tetris", 500).unwrap());
        assert_eq!(profile.high_score("tetris"), 500);
        assert!(profile.record_high_score("tetris", 501).unwrap());
        assert_eq!(stored(&profile).high_scores["tetris"], 501);
    }

    #[test]
    fn test_unlock_outcomes() {
        let mut profile = fresh();
        assert_eq!(
            profile.unlock("tetris", 50).unwrap(),
            UnlockOutcome::AlreadyUnlocked
        );
        assert_eq!(
            profile.unlock("pong", 50).unwrap(),
            UnlockOutcome::InsufficientCoins { needed: 50 }
        );

        profile.credit_coins(80).unwrap();
        assert_eq!(profile.unlock("pong", 50).unwrap(), UnlockOutcome::Unlocked);
        assert_eq!(profile.coins(), 30);
        assert!(stored(&profile).unlocked_games.iter().any(|g| g == "pong"));
        assert_eq!(
            profile.unlock("pong", 50).unwrap(),
            UnlockOutcome::AlreadyUnlocked
        );
    }

    #[test]
    fn test_unknown_keys_survive_a_save() {
        let mut store = MemoryStore::new();
        store
            .set(SAVE_KEY, r#"{"coins":5,"snakeSkin":"gold","memoryStats":{"best":12}}"#)
            .unwrap();

        let mut profile = Profile::load(store).unwrap();
        assert_eq!(profile.data().extra["snakeSkin"], "gold");
        profile.record_game_played().unwrap();

        let text = profile.store().get(SAVE_KEY).unwrap().unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["snakeSkin"], "gold");
        assert_eq!(v["memoryStats"]["best"], 12);
        assert_eq!(v["coins"], 5);
        assert_eq!(v["gamesPlayed"], 1);
    }

    #[test]
    fn test_apply_game_result_stays_in_memory() {
        let mut profile = fresh();
        assert!(profile.apply_game_result("tetris", 800, 80));
        assert!(profile.store().is_empty());
        assert_eq!(profile.coins(), 80);
        assert_eq!(profile.data().total_score, 800);
        assert_eq!(profile.high_score("tetris"), 800);

        assert!(!profile.apply_game_result("tetris", 400, 40));
        assert_eq!(profile.coins(), 120);
        assert_eq!(profile.high_score("tetris"), 800);

        profile.save().unwrap();
        assert_eq!(stored(&profile).coins, 120);
    }

    #[test]
    fn test_wallet_credit() {
        let mut profile = fresh();
        let wallet: &mut dyn Wallet = &mut profile;
        wallet.credit(20).unwrap();
        assert_eq!(wallet.balance(), 20);
    }
}
