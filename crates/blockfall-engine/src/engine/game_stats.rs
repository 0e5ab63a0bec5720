use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Points awarded per cleared row.
const POINTS_PER_ROW: usize = 10;

/// Score needed to advance one level.
const POINTS_PER_LEVEL: usize = 100;

/// The drop loop never waits less than this.
pub const MIN_DROP_INTERVAL: Duration = Duration::from_millis(1);

/// Session statistics: score, cleared lines, level and piece count.
///
/// All counters only grow during a session and start at zero.
///
/// # Scoring
///
/// - Each cleared row is worth 10 points, no matter how many are cleared at once
/// - Level is `floor(score / 100)`
/// - The drop interval halves with every level
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_lock(4);
/// stats.record_lock(3);
/// stats.record_lock(3);
///
/// assert_eq!(stats.score(), 100);
/// assert_eq!(stats.level(), 1);
/// assert_eq!(
///     stats.drop_interval(Duration::from_millis(500)),
///     Duration::from_millis(250),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: usize,
    lines: usize,
    level: usize,
    completed_pieces: usize,
    line_clears: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            lines: 0,
            level: 0,
            completed_pieces: 0,
            line_clears: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Total rows cleared this session.
    #[must_use]
    pub const fn lines(&self) -> usize {
        self.lines
    }

    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Number of pieces locked into the board.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    /// Returns a histogram of locks by number of rows cleared.
    ///
    /// Index `n` counts the locks that cleared exactly `n` rows. Locks that
    /// clear more than four rows (only possible on custom boards with
    /// custom pieces) are counted in the last slot.
    #[must_use]
    pub const fn line_clears(&self) -> &[usize; 5] {
        &self.line_clears
    }

    /// Updates statistics after a piece is locked.
    pub fn record_lock(&mut self, rows_cleared: usize) {
        self.completed_pieces += 1;
        self.line_clears[rows_cleared.min(self.line_clears.len() - 1)] += 1;
        self.lines += rows_cleared;
        self.score += POINTS_PER_ROW * rows_cleared;
        self.level = self.score / POINTS_PER_LEVEL;
    }

    /// Delay between gravity steps at the current level.
    ///
    /// Computed as `base / 2^level`, never shorter than [`MIN_DROP_INTERVAL`].
    #[must_use]
    pub fn drop_interval(&self, base: Duration) -> Duration {
        let divisor = u32::try_from(self.level)
            .ok()
            .and_then(|level| 2u32.checked_pow(level));
        divisor
            .map_or(Duration::ZERO, |divisor| base / divisor)
            .max(MIN_DROP_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_millis(500);

    #[test]
    fn test_new_stats_are_zero() {
        let stats = GameStats::new();
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.lines(), 0);
        assert_eq!(stats.level(), 0);
        assert_eq!(stats.completed_pieces(), 0);
        assert_eq!(stats.drop_interval(BASE), BASE);
    }

    #[test]
    fn test_single_row_clear() {
        let mut stats = GameStats::new();
        stats.record_lock(1);
        assert_eq!(stats.score(), 10);
        assert_eq!(stats.lines(), 1);
        assert_eq!(stats.level(), 0);
        assert_eq!(stats.line_clears(), &[0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_lock_without_clear_counts_piece() {
        let mut stats = GameStats::new();
        stats.record_lock(0);
        stats.record_lock(0);
        assert_eq!(stats.completed_pieces(), 2);
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.line_clears()[0], 2);
    }

    #[test]
    fn test_level_follows_score() {
        let mut stats = GameStats::new();
        for _ in 0..9 {
            stats.record_lock(1);
        }
        assert_eq!(stats.level(), 0);
        stats.record_lock(2);
        assert_eq!(stats.score(), 110);
        assert_eq!(stats.level(), 1);
        for _ in 0..3 {
            stats.record_lock(4);
        }
        assert_eq!(stats.score(), 230);
        assert_eq!(stats.level(), 2);
    }

    #[test]
    fn test_speed_curve_halves_per_level() {
        let mut stats = GameStats::new();
        for _ in 0..10 {
            stats.record_lock(1);
        }
        assert_eq!(stats.drop_interval(BASE), Duration::from_millis(250));
        for _ in 0..10 {
            stats.record_lock(1);
        }
        assert_eq!(stats.drop_interval(BASE), Duration::from_millis(125));
    }

    #[test]
    fn test_speed_curve_is_floored() {
        let mut stats = GameStats::new();
        for _ in 0..1000 {
            stats.record_lock(4);
        }
        assert_eq!(stats.level(), 400);
        assert_eq!(stats.drop_interval(BASE), MIN_DROP_INTERVAL);
    }

    #[test]
    fn test_oversized_clear_goes_to_last_bucket() {
        let mut stats = GameStats::new();
        stats.record_lock(6);
        assert_eq!(stats.line_clears()[4], 1);
        assert_eq!(stats.lines(), 6);
    }
}
