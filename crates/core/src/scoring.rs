//! Scoring module - line clear points, drop speed and the coin payout
//!
//! Line clears score quadratically in the number of rows removed by a single
//! lock: `100 * k * k` (a four-row clear is worth 1600, not 4 * 100).

use crate::types::{
    BASE_DROP_MS, COIN_REWARD_PER_STEP, COIN_REWARD_SCORE_STEP, DROP_INTERVAL_MIN_MS,
    DROP_INTERVAL_STEP_MS, LINE_CLEAR_BASE_POINTS,
};

/// Points for clearing `lines` rows with one lock.
pub fn line_clear_score(lines: u32) -> u32 {
    LINE_CLEAR_BASE_POINTS.saturating_mul(lines.saturating_mul(lines))
}

/// Drop interval after `total_lines` cleared lines: `max(100, 1000 - 20n)`.
pub fn drop_interval_ms(total_lines: u32) -> u32 {
    BASE_DROP_MS
        .saturating_sub(total_lines.saturating_mul(DROP_INTERVAL_STEP_MS))
        .max(DROP_INTERVAL_MIN_MS)
}

/// Coins paid for a final score: `floor(score / 200) * 20`.
pub fn coin_reward(score: u32) -> u32 {
    (score / COIN_REWARD_SCORE_STEP).saturating_mul(COIN_REWARD_PER_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_clear_score_is_quadratic() {
        assert_eq!(line_clear_score(0), 0);
        assert_eq!(line_clear_score(1), 100);
        assert_eq!(line_clear_score(2), 400);
        assert_eq!(line_clear_score(3), 900);
        assert_eq!(line_clear_score(4), 1600);
    }

    #[test]
    fn test_drop_interval_steps_and_floor() {
        assert_eq!(drop_interval_ms(0), 1000);
        assert_eq!(drop_interval_ms(1), 980);
        assert_eq!(drop_interval_ms(10), 800);
        assert_eq!(drop_interval_ms(45), 100);
        assert_eq!(drop_interval_ms(46), 100);
        assert_eq!(drop_interval_ms(u32::MAX), 100);
    }

    #[test]
    fn test_drop_interval_monotonic() {
        let mut prev = drop_interval_ms(0);
        for n in 1..200 {
            let cur = drop_interval_ms(n);
            assert!(cur <= prev);
            prev = cur;
        }
    }

    #[test]
    fn test_coin_reward() {
        assert_eq!(coin_reward(0), 0);
        assert_eq!(coin_reward(199), 0);
        assert_eq!(coin_reward(200), 20);
        assert_eq!(coin_reward(399), 20);
        assert_eq!(coin_reward(1600), 160);
        assert_eq!(coin_reward(2500), 240);
    }
}
