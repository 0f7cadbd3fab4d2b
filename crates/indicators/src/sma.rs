use crate::Indicator;
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Simple Moving Average (SMA).
#[derive(Debug, Clone)]
pub struct Sma {
    len: usize,
    buffer: VecDeque<Decimal>,
    sum: Decimal,
}

impl Sma {
    /// Returns `None` for a zero period.
    pub fn new(period: usize) -> Option<Self> {
        if period == 0 {
            return None;
        }
        Some(Self {
            len: period,
            buffer: VecDeque::with_capacity(period),
            sum: Decimal::ZERO,
        })
    }

    /// Get the current SMA value without feeding new data.
    pub fn value(&self) -> Option<Decimal> {
        if self.is_ready() {
            Some(self.sum / Decimal::from(self.len))
        } else {
            None
        }
    }
}

impl Indicator for Sma {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        self.sum += value;
        self.buffer.push_back(value);

        if self.buffer.len() > self.len {
            if let Some(removed) = self.buffer.pop_front() {
                self.sum -= removed;
            }
        }

        self.value()
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.sum = Decimal::ZERO;
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.buffer.len() == self.len
    }
}
