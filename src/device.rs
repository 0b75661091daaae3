//! Per-device monitoring state: resolved counters, sampler, histories.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collector::{
    CollectError, FileSystem, GidEntry, Panel, PortCounters, fetch_gid_table, resolve_port,
};
use crate::history::HistoryBuffer;
use crate::rates::{RateSample, RawCounters, Sampler, now_monotonic};

/// Minimum age before the cached GID table is re-read (Info view).
const GID_REFRESH_SECS: f64 = 1.0;

/// Optional-counter values read for the Data view, grouped by panel.
#[derive(Debug, Clone, Default)]
pub struct ExtrasSnapshot {
    pub rx: Vec<(&'static str, u64)>,
    pub tx: Vec<(&'static str, u64)>,
    pub other: Vec<(&'static str, u64)>,
}

/// One monitored port: counter handles, rate state, and the rolling
/// histories the charts draw from. Owned exclusively by the app loop.
#[derive(Debug)]
pub struct Device {
    pub name: String,
    pub port: u32,
    pub counters: PortCounters,
    /// Nominal link speed in Gbit/s, 0.0 when the attribute is absent.
    pub link_gbps: f64,
    pub rx_hist: HistoryBuffer,
    pub tx_hist: HistoryBuffer,
    /// Rates from the most recent tick (carried forward on read failure).
    pub current: RateSample,
    /// Cached GID table for the Info view.
    pub gids: Vec<GidEntry>,
    /// Optional counters for the Data view, refreshed alongside ticks.
    pub extras: ExtrasSnapshot,
    sampler: Sampler,
    sysfs_base: PathBuf,
    gids_refreshed_at: Option<f64>,
}

impl Device {
    /// Resolves counters and takes the baseline reading. Both are
    /// startup-fatal: a device we cannot read at all is reported before
    /// the UI is entered.
    pub fn open<F: FileSystem>(
        fs: &F,
        sysfs_base: &Path,
        name: &str,
        port: u32,
    ) -> Result<Self, CollectError> {
        let counters = resolve_port(fs, sysfs_base, name, port)?;
        let baseline = counters.read_raw(fs)?;
        let link_gbps = counters.link_gbps();
        Ok(Self {
            name: name.to_string(),
            port,
            link_gbps,
            rx_hist: HistoryBuffer::new(),
            tx_hist: HistoryBuffer::new(),
            current: RateSample::default(),
            gids: Vec::new(),
            extras: ExtrasSnapshot::default(),
            sampler: Sampler::new(baseline, counters.data_is_words),
            sysfs_base: sysfs_base.to_path_buf(),
            gids_refreshed_at: None,
            counters,
        })
    }

    /// One sampling tick. On a read failure the previous rates are carried
    /// forward (restamped with the current time) and the baseline is left
    /// alone, but history still advances so the chart scrolls at a constant
    /// cadence.
    pub fn tick<F: FileSystem>(&mut self, fs: &F) -> RateSample {
        let sample = match self.counters.read_raw(fs) {
            Ok(raw) => self.sampler.update(raw),
            Err(e) => {
                debug!(device = %self.name, "counter read failed, carrying rates forward: {}", e);
                // The rates are the last computed ones, but the sample
                // belongs to this tick: restamp it so downstream sinks
                // never log two rows with the same time.
                let mut sample = self.sampler.last();
                sample.taken_at = now_monotonic();
                sample
            }
        };
        self.rx_hist.append(sample.rx_bytes_per_sec);
        self.tx_hist.append(sample.tx_bytes_per_sec);
        self.current = sample;
        sample
    }

    /// The raw values behind the current rates (Data view).
    pub fn raw(&self) -> RawCounters {
        self.sampler.raw()
    }

    /// Re-reads the optional counters shown by the Data view. Called from
    /// the loop while that view is active, never from the renderer.
    pub fn refresh_extras<F: FileSystem>(&mut self, fs: &F) {
        self.extras = ExtrasSnapshot {
            rx: self.counters.read_extras(fs, Panel::Rx),
            tx: self.counters.read_extras(fs, Panel::Tx),
            other: self.counters.read_extras(fs, Panel::Other),
        };
    }

    /// Refreshes the cached GID table at most once per second. Called from
    /// the loop while the Info view is active, never from the renderer.
    pub fn refresh_gids<F: FileSystem>(&mut self, fs: &F) {
        let now = now_monotonic();
        let stale = self
            .gids_refreshed_at
            .is_none_or(|at| now - at > GID_REFRESH_SECS);
        if stale {
            self.gids = fetch_gid_table(fs, &self.sysfs_base, &self.name, self.port);
            self.gids_refreshed_at = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockFs, SYSFS_IB_BASE};

    fn open_mock() -> (MockFs, Device) {
        let fs = MockFs::new();
        fs.add_ib_port("mlx5_0", 1);
        let dev = Device::open(&fs, Path::new(SYSFS_IB_BASE), "mlx5_0", 1).unwrap();
        (fs, dev)
    }

    #[test]
    fn open_reads_baseline_and_metadata() {
        let (_fs, dev) = open_mock();
        assert_eq!(dev.name, "mlx5_0");
        assert!((dev.link_gbps - 100.0).abs() < 1e-9);
        assert!(dev.rx_hist.is_empty());
        assert_eq!(dev.raw().rx_data, 0);
    }

    #[test]
    fn open_fails_without_counters() {
        let fs = MockFs::new();
        assert!(Device::open(&fs, Path::new(SYSFS_IB_BASE), "nope", 1).is_err());
    }

    #[test]
    fn tick_appends_one_sample_per_direction() {
        let (fs, mut dev) = open_mock();
        fs.set_counter("mlx5_0", 1, "port_rcv_data", 1000);
        fs.set_counter("mlx5_0", 1, "port_xmit_data", 500);
        dev.tick(&fs);
        assert_eq!(dev.rx_hist.len(), 1);
        assert_eq!(dev.tx_hist.len(), 1);
        assert_eq!(dev.raw().rx_data, 1000);
        // Words device: 1000 words = 4000 bytes regardless of dt sign.
        assert!(dev.current.rx_bytes_per_sec > 0.0);
    }

    #[test]
    fn failed_tick_freezes_rates_but_scrolls_history() {
        let (fs, mut dev) = open_mock();
        fs.set_counter("mlx5_0", 1, "port_rcv_data", 1000);
        let before = dev.tick(&fs);

        fs.remove_file(dev.counters.rx_data.clone());
        let carried = dev.tick(&fs);
        assert_eq!(carried.rx_bytes_per_sec, before.rx_bytes_per_sec);
        assert_eq!(dev.rx_hist.len(), 2);
        // Baseline untouched: still the last successful reading.
        assert_eq!(dev.raw().rx_data, 1000);
    }

    #[test]
    fn failed_tick_restamps_sample_time() {
        let (fs, mut dev) = open_mock();
        fs.set_counter("mlx5_0", 1, "port_rcv_data", 1000);
        let before = dev.tick(&fs);

        fs.remove_file(dev.counters.rx_data.clone());
        std::thread::sleep(std::time::Duration::from_millis(5));
        let carried = dev.tick(&fs);
        // Same rates, but the timestamp belongs to the new tick, so a
        // per-tick log never repeats a time_s value.
        assert_eq!(carried.rx_bytes_per_sec, before.rx_bytes_per_sec);
        assert!(carried.taken_at > before.taken_at);
    }

    #[test]
    fn extras_snapshot_groups_by_panel() {
        let (fs, mut dev) = open_mock();
        fs.set_counter("mlx5_0", 1, "port_xmit_wait", 9);
        fs.set_counter("mlx5_0", 1, "link_downed", 2);
        // Re-resolve so the new optional counters are picked up.
        let mut dev2 = Device::open(&fs, Path::new(SYSFS_IB_BASE), "mlx5_0", 1).unwrap();
        dev2.refresh_extras(&fs);
        assert_eq!(dev2.extras.tx, vec![("xmit_wait", 9)]);
        assert_eq!(dev2.extras.other, vec![("link_downed", 2)]);
        assert!(dev2.extras.rx.is_empty());
        // The original handle resolved before the counters existed.
        dev.refresh_extras(&fs);
        assert!(dev.extras.tx.is_empty());
    }

    #[test]
    fn gid_cache_populates_once() {
        let (fs, mut dev) = open_mock();
        dev.refresh_gids(&fs);
        assert_eq!(dev.gids.len(), 1);
        let first = dev.gids.clone();
        // Immediate second call is a cache hit.
        dev.refresh_gids(&fs);
        assert_eq!(dev.gids, first);
    }
}
