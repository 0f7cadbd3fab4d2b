//! Moving-average streak: how many of the latest closes sit on the same side
//! of the current moving average.
//!
//! The average is taken once, over the most recent `window` closes, and every
//! earlier close is compared against that single value. It is not a rolling
//! crossover detector: an older close is never compared with its own trailing
//! average.
//!
//! The window cannot sit strictly on one side of its own mean, so the scan
//! always stops inside it: the magnitude is at most `window - 1`, and history
//! older than the window never changes the result.

use crate::sma::Sma;
use crate::Indicator;
use rust_decimal::Decimal;

/// Errors from streak measurement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreakError {
    #[error("insufficient data: need {required} closes, got {observed}")]
    InsufficientData { required: usize, observed: usize },
    #[error("moving average window must be > 0")]
    InvalidWindow,
}

/// Result of a streak measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    /// Mean of the last `window` closes.
    pub moving_average: Decimal,
    /// Most recent close.
    pub latest: Decimal,
    /// Signed period count: positive above the average, negative at or below.
    /// Magnitude is always at least 1.
    pub periods: i64,
}

impl Streak {
    pub fn is_above(&self) -> bool {
        self.periods > 0
    }
}

/// Measure the streak of `closes` (oldest first) against its `window`-period SMA.
pub fn measure_streak(closes: &[Decimal], window: usize) -> Result<Streak, StreakError> {
    let mut sma = Sma::new(window).ok_or(StreakError::InvalidWindow)?;
    if closes.len() < window {
        return Err(StreakError::InsufficientData {
            required: window,
            observed: closes.len(),
        });
    }

    // Length is checked above, so both are present.
    let (Some(ma), Some(&latest)) = (sma.over_tail(closes), closes.last()) else {
        return Err(StreakError::InsufficientData {
            required: window,
            observed: closes.len(),
        });
    };

    // Equality counts as "not above".
    let above = latest > ma;

    let count = closes[..closes.len() - 1]
        .iter()
        .rev()
        .take_while(|&&p| if above { p > ma } else { p < ma })
        .count();

    let magnitude = count as i64 + 1;
    Ok(Streak {
        moving_average: ma,
        latest,
        periods: if above { magnitude } else { -magnitude },
    })
}

/// Signed streak length of `closes` relative to its `window`-period SMA.
pub fn compute_streak(closes: &[Decimal], window: usize) -> Result<i64, StreakError> {
    measure_streak(closes, window).map(|s| s.periods)
}
