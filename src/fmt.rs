//! Shared formatting helpers for the TUI and the chart axis.
//!
//! All pure formatting functions live here (no ratatui styles, no layout).
//! Rates use SI-style decimal tiers (÷1000), matching how link speeds are
//! quoted for InfiniBand hardware.

use crate::tui::state::Units;

/// Decimal magnitude prefixes for rate formatting. The last tier is sticky:
/// values past the Peta range keep dividing no further.
const PREFIXES: [&str; 6] = ["", "K", "M", "G", "T", "P"];

/// Reduce a value into a (mantissa, prefix-index) pair by repeated ÷1000.
fn reduce(mut v: f64, max_idx: usize) -> (f64, usize) {
    let mut idx = 0;
    while v.abs() >= 1000.0 && idx < max_idx {
        v /= 1000.0;
        idx += 1;
    }
    (v, idx)
}

/// Format a bytes-per-second rate in the chosen display units.
///
/// `"  1.00 Gb/s"` for bits, `" 125.00 MB/s"` for bytes.
pub fn human_rate(bytes_per_sec: f64, units: Units) -> String {
    let v = match units {
        Units::Bits => bytes_per_sec * 8.0,
        Units::Bytes => bytes_per_sec,
    };
    let (v, idx) = reduce(v, PREFIXES.len() - 1);
    let suffix = if units == Units::Bits { "b/s" } else { "B/s" };
    format!("{:6.2} {}{}", v, PREFIXES[idx], suffix)
}

/// Format a packets-per-second rate: `"  1.50 Mpps"`.
pub fn human_pps(pps: f64) -> String {
    // Packet rates realistically top out in the G range; cap at T.
    let (v, idx) = reduce(pps, 4);
    format!("{:6.2} {}pps", v, PREFIXES[idx])
}

/// Format a chart axis label for a value already converted to display units.
///
/// `"100.00 Gb/s"`, `" 50.00 Gb/s"`, `"  0.00 b/s"`.
pub fn scale_label(display_per_sec: f64, units: Units) -> String {
    let (v, idx) = reduce(display_per_sec, PREFIXES.len() - 1);
    let suffix = if units == Units::Bits { "b/s" } else { "B/s" };
    format!("{:6.2} {}{}", v, PREFIXES[idx], suffix)
}

/// The bottom-of-axis label (always zero).
pub fn zero_label(units: Units) -> &'static str {
    match units {
        Units::Bits => "0.00 b/s",
        Units::Bytes => "0.00 B/s",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_picks_decimal_tiers() {
        assert_eq!(human_rate(125_000_000.0, Units::Bits).trim(), "1.00 Gb/s");
        assert_eq!(human_rate(125_000_000.0, Units::Bytes).trim(), "125.00 MB/s");
        assert_eq!(human_rate(0.0, Units::Bits).trim(), "0.00 b/s");
        assert_eq!(human_rate(500.0, Units::Bytes).trim(), "500.00 B/s");
    }

    #[test]
    fn rate_sticks_at_last_tier() {
        // 2^63 bytes/s in bits is past Peta; must not index out of range.
        let s = human_rate(9.2e18, Units::Bits);
        assert!(s.ends_with("Pb/s"), "got {s}");
    }

    #[test]
    fn pps_formatting() {
        assert_eq!(human_pps(1_500_000.0).trim(), "1.50 Mpps");
        assert_eq!(human_pps(950.0).trim(), "950.00 pps");
    }

    #[test]
    fn scale_labels() {
        assert_eq!(scale_label(100e9, Units::Bits).trim(), "100.00 Gb/s");
        assert_eq!(scale_label(50e9, Units::Bits).trim(), "50.00 Gb/s");
        assert_eq!(zero_label(Units::Bits), "0.00 b/s");
        assert_eq!(zero_label(Units::Bytes), "0.00 B/s");
    }
}
