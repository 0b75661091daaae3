//! Bounded per-direction rate history for the scrolling charts.

use std::collections::VecDeque;

/// Number of samples retained per device and direction.
pub const HISTORY_CAP: usize = 4096;

/// Fixed-capacity chronological sequence of rate samples.
///
/// Index 0 is the oldest sample; once at capacity, appending evicts the
/// oldest entry. Capacity is fixed at construction.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    buf: VecDeque<f64>,
    cap: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAP)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Appends a sample, evicting the oldest when full.
    pub fn append(&mut self, value: f64) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(value);
    }

    /// The most recent `min(n, len)` samples in chronological order.
    pub fn window(&self, n: usize) -> Vec<f64> {
        let take = n.min(self.buf.len());
        self.buf.iter().skip(self.buf.len() - take).copied().collect()
    }

    /// The most recent sample, if any.
    pub fn latest(&self) -> Option<f64> {
        self.buf.back().copied()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
