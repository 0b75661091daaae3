//! Counter discovery and raw reads under `/sys/class/infiniband`.
//!
//! Counter file names vary across kernel versions and drivers, so each
//! counter is resolved once at startup by probing a candidate list. After
//! resolution the rest of the crate only reads through the resolved paths
//! and never inspects names again.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collector::traits::FileSystem;
use crate::rates::{RawCounters, now_monotonic};

/// Default sysfs root for InfiniBand devices.
pub const SYSFS_IB_BASE: &str = "/sys/class/infiniband";

/// Highest GID index probed for the Info view.
const GID_TABLE_MAX: u32 = 256;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for counter resolution and reads.
#[derive(Debug)]
pub enum CollectError {
    /// The four mandatory counters could not all be located.
    MissingCounters { device: String, port: u32 },
    /// I/O error reading a sysfs file.
    Io(io::Error),
    /// A counter file held something other than an unsigned integer.
    Parse { path: PathBuf, value: String },
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::MissingCounters { device, port } => write!(
                f,
                "required counters not found under {}/{}/ports/{}/counters",
                SYSFS_IB_BASE, device, port
            ),
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse { path, value } => {
                write!(f, "unparseable counter {}: {:?}", path.display(), value)
            }
        }
    }
}

impl std::error::Error for CollectError {}

impl From<io::Error> for CollectError {
    fn from(e: io::Error) -> Self {
        CollectError::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Candidate name tables
// ---------------------------------------------------------------------------

const TX_DATA_CANDIDATES: &[&str] = &["port_xmit_data", "tx_bytes"];
const RX_DATA_CANDIDATES: &[&str] = &["port_rcv_data", "rx_bytes"];
const TX_PKTS_CANDIDATES: &[&str] = &["port_xmit_packets", "port_xmit_pkts", "tx_packets"];
const RX_PKTS_CANDIDATES: &[&str] = &["port_rcv_packets", "port_rcv_pkts", "rx_packets"];

/// Optional counters shown by the Data view, with display label, candidate
/// names, and the panel they belong to.
const OPTIONAL_COUNTERS: &[(&str, &[&str], Panel)] = &[
    ("port_rcv_errors", &["port_rcv_errors"], Panel::Rx),
    (
        "rcv_remote_phy",
        &["port_rcv_remote_physical_errors"],
        Panel::Rx,
    ),
    (
        "rcv_switch_relay",
        &["port_rcv_switch_relay_errors"],
        Panel::Rx,
    ),
    ("xmit_discards", &["port_xmit_discards"], Panel::Tx),
    ("xmit_wait", &["port_xmit_wait"], Panel::Tx),
    (
        "local_phy_errors",
        &["port_local_phy_errors", "port_local_physical_errors"],
        Panel::Other,
    ),
    (
        "symbol_error",
        &["symbol_error", "symbol_errors"],
        Panel::Other,
    ),
    (
        "link_err_recov",
        &["link_error_recovery"],
        Panel::Other,
    ),
    ("link_downed", &["link_downed"], Panel::Other),
    ("vl15_dropped", &["VL15_dropped", "vl15_dropped"], Panel::Other),
    (
        "excess_buf_over",
        &["excessive_buffer_overrun_errors"],
        Panel::Other,
    ),
];

/// Which Data-view panel an optional counter is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Rx,
    Tx,
    Other,
}

/// Resolved handle to one optional counter.
#[derive(Debug, Clone)]
pub struct OptionalCounter {
    pub label: &'static str,
    pub panel: Panel,
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolved counter paths and static link metadata for one port.
#[derive(Debug, Clone)]
pub struct PortCounters {
    pub device: String,
    pub port: u32,
    pub rx_data: PathBuf,
    pub tx_data: PathBuf,
    pub rx_pkts: PathBuf,
    pub tx_pkts: PathBuf,
    /// Data counters report 4-byte words rather than bytes
    /// (`port_xmit_data` / `port_rcv_data` semantics).
    pub data_is_words: bool,
    pub link_layer: Option<String>,
    pub rate: Option<String>,
    pub extras: Vec<OptionalCounter>,
}

/// Returns the first candidate that exists under `base`, if any.
fn first_existing<F: FileSystem>(fs: &F, base: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| base.join(name))
        .find(|p| fs.exists(p))
}

fn read_trimmed<F: FileSystem>(fs: &F, path: &Path) -> Option<String> {
    fs.read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Locates the mandatory counters and link metadata for `device`/`port`.
///
/// Missing mandatory counters are a startup-fatal condition; missing
/// metadata and optional counters merely degrade the display.
pub fn resolve_port<F: FileSystem>(
    fs: &F,
    sysfs_base: &Path,
    device: &str,
    port: u32,
) -> Result<PortCounters, CollectError> {
    let port_base = sysfs_base.join(device).join("ports").join(port.to_string());
    let counters_base = port_base.join("counters");
    if !fs.exists(&counters_base) {
        return Err(CollectError::MissingCounters {
            device: device.to_string(),
            port,
        });
    }

    let link_layer = read_trimmed(fs, &port_base.join("link_layer"));
    let rate = read_trimmed(fs, &port_base.join("rate"));

    let tx_data = first_existing(fs, &counters_base, TX_DATA_CANDIDATES);
    let rx_data = first_existing(fs, &counters_base, RX_DATA_CANDIDATES);
    let tx_pkts = first_existing(fs, &counters_base, TX_PKTS_CANDIDATES);
    let rx_pkts = first_existing(fs, &counters_base, RX_PKTS_CANDIDATES);

    let (Some(tx_data), Some(rx_data), Some(tx_pkts), Some(rx_pkts)) =
        (tx_data, rx_data, tx_pkts, rx_pkts)
    else {
        return Err(CollectError::MissingCounters {
            device: device.to_string(),
            port,
        });
    };

    // port_*_data counters count 4-byte words; tx_bytes/rx_bytes count bytes.
    let data_is_words = tx_data.ends_with("port_xmit_data") || rx_data.ends_with("port_rcv_data");

    let extras = OPTIONAL_COUNTERS
        .iter()
        .filter_map(|(label, candidates, panel)| {
            first_existing(fs, &counters_base, candidates).map(|path| OptionalCounter {
                label,
                panel: *panel,
                path,
            })
        })
        .collect();

    Ok(PortCounters {
        device: device.to_string(),
        port,
        rx_data,
        tx_data,
        rx_pkts,
        tx_pkts,
        data_is_words,
        link_layer,
        rate,
        extras,
    })
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Reads a single `u64` counter file.
pub fn read_u64<F: FileSystem>(fs: &F, path: &Path) -> Result<u64, CollectError> {
    let raw = fs.read_to_string(path)?;
    let trimmed = raw.trim();
    // Some counters carry trailing annotations; the leading field is the value.
    let field = trimmed.split_whitespace().next().unwrap_or("");
    field.parse::<u64>().map_err(|_| CollectError::Parse {
        path: path.to_path_buf(),
        value: trimmed.to_string(),
    })
}

impl PortCounters {
    /// Reads all four mandatory counters, timestamped with the monotonic
    /// clock. Any single failure fails the whole reading so the sampler
    /// baseline stays consistent.
    pub fn read_raw<F: FileSystem>(&self, fs: &F) -> Result<RawCounters, CollectError> {
        let rx_data = read_u64(fs, &self.rx_data)?;
        let tx_data = read_u64(fs, &self.tx_data)?;
        let rx_pkts = read_u64(fs, &self.rx_pkts)?;
        let tx_pkts = read_u64(fs, &self.tx_pkts)?;
        Ok(RawCounters {
            rx_data,
            tx_data,
            rx_pkts,
            tx_pkts,
            taken_at: now_monotonic(),
        })
    }

    /// Reads the optional counters for one Data-view panel. Counters that
    /// fail to read are skipped for this tick.
    pub fn read_extras<F: FileSystem>(&self, fs: &F, panel: Panel) -> Vec<(&'static str, u64)> {
        self.extras
            .iter()
            .filter(|c| c.panel == panel)
            .filter_map(|c| match read_u64(fs, &c.path) {
                Ok(v) => Some((c.label, v)),
                Err(e) => {
                    debug!("optional counter {} unreadable: {}", c.label, e);
                    None
                }
            })
            .collect()
    }

    /// Parses the numeric link speed (Gb/s) from the `rate` attribute,
    /// e.g. `"100 Gb/sec (4X EDR)"` -> `100.0`. Zero when unknown.
    pub fn link_gbps(&self) -> f64 {
        self.rate.as_deref().map_or(0.0, parse_rate_gbps)
    }
}

/// Leading-float parse of a sysfs `rate` string.
pub fn parse_rate_gbps(rate: &str) -> f64 {
    let numeric: String = rate
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric.parse().unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Device enumeration
// ---------------------------------------------------------------------------

/// Lists devices whose first port is ACTIVE, sorted by name.
pub fn enumerate_active_devices<F: FileSystem>(fs: &F, sysfs_base: &Path) -> Vec<String> {
    let Ok(entries) = fs.read_dir(sysfs_base) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter(|name| {
            let state = sysfs_base.join(name).join("ports/1/state");
            read_trimmed(fs, &state).is_some_and(|s| s.contains("ACTIVE"))
        })
        .collect();
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// GID table
// ---------------------------------------------------------------------------

/// One populated row of the port GID table (Info view).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GidEntry {
    pub index: u32,
    pub gid: String,
    pub gid_type: String,
    pub ndev: String,
}

/// A GID of all zero nibbles is an empty table slot.
fn gid_is_zero(gid: &str) -> bool {
    gid.chars().all(|c| c == ':' || c == '0')
}

/// Reads the non-zero GID entries for a port, joined with their type and
/// netdev attributes. Missing attributes render as empty strings.
pub fn fetch_gid_table<F: FileSystem>(
    fs: &F,
    sysfs_base: &Path,
    device: &str,
    port: u32,
) -> Vec<GidEntry> {
    let port_base = sysfs_base.join(device).join("ports").join(port.to_string());
    (0..GID_TABLE_MAX)
        .filter_map(|i| {
            let gid = read_trimmed(fs, &port_base.join("gids").join(i.to_string()))?;
            if gid_is_zero(&gid) {
                return None;
            }
            let gid_type = read_trimmed(fs, &port_base.join("gid_attrs/types").join(i.to_string()))
                .unwrap_or_default();
            let ndev = read_trimmed(fs, &port_base.join("gid_attrs/ndevs").join(i.to_string()))
                .unwrap_or_default();
            Some(GidEntry {
                index: i,
                gid,
                gid_type,
                ndev,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn base() -> PathBuf {
        PathBuf::from(SYSFS_IB_BASE)
    }

    #[test]
    fn resolves_preferred_candidates_in_order() {
        let fs = MockFs::new();
        fs.add_ib_port("mlx5_0", 1);
        let pc = resolve_port(&fs, &base(), "mlx5_0", 1).unwrap();
        assert!(pc.rx_data.ends_with("port_rcv_data"));
        assert!(pc.tx_pkts.ends_with("port_xmit_packets"));
        assert!(pc.data_is_words);
        assert_eq!(pc.link_layer.as_deref(), Some("InfiniBand"));
        assert!((pc.link_gbps() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_byte_counters() {
        let fs = MockFs::new();
        let c = "/sys/class/infiniband/rxe0/ports/1/counters";
        fs.add_file(format!("{c}/tx_bytes"), "0");
        fs.add_file(format!("{c}/rx_bytes"), "0");
        fs.add_file(format!("{c}/tx_packets"), "0");
        fs.add_file(format!("{c}/rx_packets"), "0");
        let pc = resolve_port(&fs, &base(), "rxe0", 1).unwrap();
        assert!(pc.rx_data.ends_with("rx_bytes"));
        assert!(!pc.data_is_words, "byte-named counters must not be scaled");
        assert_eq!(pc.rate, None);
        assert_eq!(pc.link_gbps(), 0.0);
    }

    #[test]
    fn missing_mandatory_counter_is_fatal() {
        let fs = MockFs::new();
        let c = "/sys/class/infiniband/bad0/ports/1/counters";
        fs.add_file(format!("{c}/port_rcv_data"), "0");
        // No tx counters at all.
        let err = resolve_port(&fs, &base(), "bad0", 1).unwrap_err();
        assert!(matches!(err, CollectError::MissingCounters { .. }));
        assert!(err.to_string().contains("bad0"));
    }

    #[test]
    fn read_raw_is_all_or_nothing() {
        let fs = MockFs::new();
        fs.add_ib_port("mlx5_0", 1);
        let pc = resolve_port(&fs, &base(), "mlx5_0", 1).unwrap();
        fs.set_counter("mlx5_0", 1, "port_rcv_data", 42);
        let raw = pc.read_raw(&fs).unwrap();
        assert_eq!(raw.rx_data, 42);

        fs.remove_file(pc.tx_pkts.clone());
        assert!(pc.read_raw(&fs).is_err());
    }

    #[test]
    fn parse_counter_value() {
        let fs = MockFs::new();
        fs.add_file("/x/cnt", " 12345 \n");
        assert_eq!(read_u64(&fs, Path::new("/x/cnt")).unwrap(), 12345);
        fs.add_file("/x/bad", "N/A\n");
        assert!(matches!(
            read_u64(&fs, Path::new("/x/bad")),
            Err(CollectError::Parse { .. })
        ));
    }

    #[test]
    fn rate_string_parsing() {
        assert_eq!(parse_rate_gbps("100 Gb/sec (4X EDR)"), 100.0);
        assert_eq!(parse_rate_gbps("2.5 Gb/sec (1X SDR)"), 2.5);
        assert_eq!(parse_rate_gbps("garbage"), 0.0);
        assert_eq!(parse_rate_gbps(""), 0.0);
    }

    #[test]
    fn enumeration_filters_inactive_ports() {
        let fs = MockFs::new();
        fs.add_ib_port("mlx5_0", 1);
        fs.add_ib_port("mlx5_1", 1);
        fs.add_file(
            "/sys/class/infiniband/mlx5_2/ports/1/state",
            "1: DOWN\n",
        );
        let devs = enumerate_active_devices(&fs, &base());
        assert_eq!(devs, ["mlx5_0", "mlx5_1"]);
    }

    #[test]
    fn gid_table_skips_zero_entries() {
        let fs = MockFs::new();
        fs.add_ib_port("mlx5_0", 1);
        let gids = fetch_gid_table(&fs, &base(), "mlx5_0", 1);
        assert_eq!(gids.len(), 1);
        assert_eq!(gids[0].index, 0);
        assert_eq!(gids[0].gid_type, "IB/RoCE v1");
        assert_eq!(gids[0].ndev, "mlx5_0-ndev");
    }

    #[test]
    fn extras_are_optional() {
        let fs = MockFs::new();
        fs.add_ib_port("mlx5_0", 1);
        fs.set_counter("mlx5_0", 1, "port_xmit_wait", 7);
        fs.set_counter("mlx5_0", 1, "symbol_error", 3);
        let pc = resolve_port(&fs, &base(), "mlx5_0", 1).unwrap();
        assert_eq!(pc.read_extras(&fs, Panel::Tx), vec![("xmit_wait", 7)]);
        assert_eq!(pc.read_extras(&fs, Panel::Other), vec![("symbol_error", 3)]);
        assert!(pc.read_extras(&fs, Panel::Rx).is_empty());
    }
}
