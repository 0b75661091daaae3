//! InfiniBand port counter collection.
//!
//! Counter file locations vary by driver, so resolution probes candidate
//! names once at startup and hands back opaque path handles; everything
//! above this module reads through the handles only. All filesystem access
//! goes through the [`FileSystem`] trait so tests run against [`MockFs`].

pub mod mock;
pub mod sysfs;
pub mod traits;

pub use mock::MockFs;
pub use sysfs::{
    CollectError, GidEntry, OptionalCounter, Panel, PortCounters, SYSFS_IB_BASE,
    enumerate_active_devices, fetch_gid_table, parse_rate_gbps, read_u64, resolve_port,
};
pub use traits::{FileSystem, RealFs};
