//! Session state: view mode, display units, pause flag.
//!
//! All mutation happens through the transition methods below, driven by key
//! events in the single loop thread. Nothing here is ambient or global.

/// Which content the panels show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Scrolling RX/TX rate charts.
    #[default]
    Plot,
    /// Raw counter values (RX / TX / Other panels).
    Data,
    /// GID / link attribute table.
    Info,
}

impl ViewMode {
    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::Plot => "PLOT",
            ViewMode::Data => "DATA",
            ViewMode::Info => "INFO",
        }
    }
}

/// Display units for byte rates. Storage is always bytes/s; this only
/// affects rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Bits,
    Bytes,
}

impl Units {
    pub fn label(&self) -> &'static str {
        match self {
            Units::Bits => "bits",
            Units::Bytes => "bytes",
        }
    }

    /// Converts a stored bytes/s value into this display unit.
    pub fn from_bytes_per_sec(&self, bps: f64) -> f64 {
        match self {
            Units::Bits => bps * 8.0,
            Units::Bytes => bps,
        }
    }
}

/// Per-session UI state, owned by the loop coordinator.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub view: ViewMode,
    pub units: Units,
    pub paused: bool,
}

impl SessionState {
    pub fn new(units: Units) -> Self {
        Self {
            units,
            ..Default::default()
        }
    }

    /// `d`: Data <-> Plot; leaves Info by entering Data.
    pub fn toggle_data(&mut self) {
        self.view = match self.view {
            ViewMode::Data => ViewMode::Plot,
            ViewMode::Plot | ViewMode::Info => ViewMode::Data,
        };
    }

    /// `i`: Info <-> Plot; leaves Data by entering Info.
    pub fn toggle_info(&mut self) {
        self.view = match self.view {
            ViewMode::Info => ViewMode::Plot,
            ViewMode::Plot | ViewMode::Data => ViewMode::Info,
        };
    }

    /// `u`: bits <-> bytes.
    pub fn toggle_units(&mut self) {
        self.units = match self.units {
            Units::Bits => Units::Bytes,
            Units::Bytes => Units::Bits,
        };
    }

    /// `p`: freeze sampling (display keeps the last values).
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = SessionState::default();
        assert_eq!(s.view, ViewMode::Plot);
        assert_eq!(s.units, Units::Bits);
        assert!(!s.paused);
    }

    #[test]
    fn data_toggle_clears_info() {
        let mut s = SessionState::default();
        s.toggle_info();
        assert_eq!(s.view, ViewMode::Info);
        s.toggle_data();
        assert_eq!(s.view, ViewMode::Data);
        s.toggle_data();
        assert_eq!(s.view, ViewMode::Plot);
    }

    #[test]
    fn info_toggle_clears_data() {
        let mut s = SessionState::default();
        s.toggle_data();
        s.toggle_info();
        assert_eq!(s.view, ViewMode::Info);
        s.toggle_info();
        assert_eq!(s.view, ViewMode::Plot);
    }

    #[test]
    fn unit_conversion_is_display_only() {
        assert_eq!(Units::Bits.from_bytes_per_sec(125.0), 1000.0);
        assert_eq!(Units::Bytes.from_bytes_per_sec(125.0), 125.0);
        let mut s = SessionState::default();
        s.toggle_units();
        assert_eq!(s.units, Units::Bytes);
        s.toggle_units();
        assert_eq!(s.units, Units::Bits);
    }
}
