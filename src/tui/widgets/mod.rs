//! Frame widgets: header band, rate charts, counter and GID panels.

pub mod chart;
pub mod data;
pub mod header;
pub mod info;
