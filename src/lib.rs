//! ibmon - InfiniBand port bandwidth monitor library.
//!
//! This library provides the functionality behind the `ibmon` binary:
//! - `collector` - counter discovery and raw reads under sysfs
//! - `rates` - wraparound-safe rate computation
//! - `tui` - the interactive chart/data/info views

pub mod collector;
pub mod csv;
pub mod device;
pub mod fmt;
pub mod history;
pub mod rates;
pub mod tui;
