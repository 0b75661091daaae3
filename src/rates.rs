//! Rate computation from raw port counters.
//!
//! This module is the single source of truth for turning two cumulative
//! counter readings into bytes-per-second / packets-per-second rates:
//! wraparound-safe deltas, word-to-byte conversion, and carry-forward on
//! transient read failures.

use std::sync::OnceLock;
use std::time::Instant;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Smallest dt substituted when the clock reports a non-positive interval,
/// so a rate is never divided by zero.
pub const MIN_DT_SECS: f64 = 1e-9;

/// Monotonic seconds since process start.
pub fn now_monotonic() -> f64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64()
}

// ---------------------------------------------------------------------------
// Raw readings and derived rates
// ---------------------------------------------------------------------------

/// One reading of the four mandatory counters, tagged with a monotonic
/// timestamp. Produced by the collector, consumed immediately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawCounters {
    pub rx_data: u64,
    pub tx_data: u64,
    pub rx_pkts: u64,
    pub tx_pkts: u64,
    /// Monotonic seconds (see [`now_monotonic`]).
    pub taken_at: f64,
}

/// Derived per-second rates. Byte rates are stored as bytes/s regardless of
/// the display unit; bits/s is a rendering transform only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateSample {
    pub rx_bytes_per_sec: f64,
    pub tx_bytes_per_sec: f64,
    pub rx_pkts_per_sec: f64,
    pub tx_pkts_per_sec: f64,
    /// Monotonic timestamp of the reading this sample was computed from.
    pub taken_at: f64,
}

/// Modulo-2^64 counter delta. A current value below the previous one means
/// the counter wrapped, and two's-complement subtraction yields exactly the
/// distance travelled past the wrap.
pub fn wrapping_delta(curr: u64, prev: u64) -> u64 {
    curr.wrapping_sub(prev)
}

// ---------------------------------------------------------------------------
// Sampler
// ---------------------------------------------------------------------------

/// Per-device rate state: the previous reading and the last computed rates.
///
/// Constructed from a successful baseline reading; [`Sampler::update`]
/// advances the baseline, [`Sampler::last`] carries the previous rates
/// forward for ticks where the counters could not be read.
#[derive(Debug, Clone)]
pub struct Sampler {
    /// Byte counters report 4-byte words (InfiniBand `port_*_data`).
    data_is_words: bool,
    prev: RawCounters,
    last: RateSample,
}

impl Sampler {
    pub fn new(baseline: RawCounters, data_is_words: bool) -> Self {
        Self {
            data_is_words,
            prev: baseline,
            last: RateSample::default(),
        }
    }

    /// Computes rates from the previous reading and advances the baseline.
    pub fn update(&mut self, curr: RawCounters) -> RateSample {
        let mut dt = curr.taken_at - self.prev.taken_at;
        if dt <= 0.0 {
            dt = MIN_DT_SECS;
        }

        let mut d_rx = wrapping_delta(curr.rx_data, self.prev.rx_data);
        let mut d_tx = wrapping_delta(curr.tx_data, self.prev.tx_data);
        let d_rxp = wrapping_delta(curr.rx_pkts, self.prev.rx_pkts);
        let d_txp = wrapping_delta(curr.tx_pkts, self.prev.tx_pkts);

        // Word-oriented data counters count 4-byte units; packet counters
        // are never scaled.
        if self.data_is_words {
            d_rx *= 4;
            d_tx *= 4;
        }

        let sample = RateSample {
            rx_bytes_per_sec: d_rx as f64 / dt,
            tx_bytes_per_sec: d_tx as f64 / dt,
            rx_pkts_per_sec: d_rxp as f64 / dt,
            tx_pkts_per_sec: d_txp as f64 / dt,
            taken_at: curr.taken_at,
        };

        self.prev = curr;
        self.last = sample;
        sample
    }

    /// The last successfully computed rates, for ticks where the read
    /// failed. The baseline is deliberately not advanced so the next
    /// successful tick measures across the full gap.
    pub fn last(&self) -> RateSample {
        self.last
    }

    /// The most recent raw reading (shown verbatim by the Data view).
    pub fn raw(&self) -> RawCounters {
        self.prev
    }
}
