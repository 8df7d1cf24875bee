//! Training configuration knobs.

use crate::projector::DEFAULT_MAX_RANK;

/// Trailing window, in days, a source should aggregate over by default.
pub const DEFAULT_WINDOW_DAYS: u32 = 90;

/// Tunable parameters for one batch training run.
///
/// # Examples
///
/// ```
/// use basket_core::TrainingConfig;
///
/// let config = TrainingConfig::default();
/// assert_eq!(config.window_days, 90);
/// assert_eq!(config.max_rank, 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingConfig {
    /// Trailing interaction window, in days, the source should honour.
    pub window_days: u32,
    /// Upper bound on the latent rank; capped by the matrix dimensions.
    pub max_rank: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            max_rank: DEFAULT_MAX_RANK,
        }
    }
}
