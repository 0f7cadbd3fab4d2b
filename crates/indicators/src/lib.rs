//! Price indicators used by trend evaluation.
//!
//! [`sma::Sma`] is a streaming simple moving average; [`streak`] measures how
//! many of the latest closes sit on the same side of that average.

pub mod sma;
pub mod streak;

use rust_decimal::Decimal;

/// Trait for streaming (incremental) indicators.
/// Feed one value at a time; the indicator maintains internal state.
pub trait Indicator: Send + Sync {
    /// Process the next value and return the indicator output (if ready).
    fn next(&mut self, value: Decimal) -> Option<Decimal>;

    /// Reset the indicator to its initial state.
    fn reset(&mut self);

    /// The minimum number of data points needed before the indicator produces output.
    fn period(&self) -> usize;

    /// Whether the indicator has enough data to produce output.
    fn is_ready(&self) -> bool;

    /// Reset, then feed the trailing `period()` values of `values`.
    /// Returns `None` when fewer than `period()` values are supplied.
    fn over_tail(&mut self, values: &[Decimal]) -> Option<Decimal> {
        self.reset();
        let start = values.len().checked_sub(self.period())?;
        values[start..].iter().fold(None, |_, v| self.next(*v))
    }
}
