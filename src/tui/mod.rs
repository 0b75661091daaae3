//! Terminal user interface.
//!
//! A single-threaded loop samples the counters, handles keys, and draws
//! scrolling rate charts per device, in the style of traffic monitors like
//! iftop.

pub mod app;
pub mod input;
pub mod layout;
pub mod render;
pub mod state;
pub mod style;
pub mod widgets;

pub use app::{App, AppOptions};
pub use state::{SessionState, Units, ViewMode};
