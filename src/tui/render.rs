//! Frame composition: the header band plus one cell per device, filled
//! according to the active view.

use ratatui::Frame;

use crate::device::Device;

use super::layout::{Geometry, stacked_panes};
use super::state::{SessionState, ViewMode};
use super::style::Styles;
use super::widgets::{chart, data, header, info};

/// Renders one frame. `filler` false marks a view-switch frame with no
/// fresh sample behind it, which blanks the idle dots in the charts.
pub fn render(
    f: &mut Frame,
    geometry: &Geometry,
    devices: &[Device],
    state: &SessionState,
    interval_secs: f64,
    filler: bool,
) {
    header::render(f, geometry.header, devices, state, interval_secs);

    for (dev, cell) in devices.iter().zip(&geometry.cells) {
        match state.view {
            ViewMode::Plot => {
                let panes = stacked_panes(*cell, ViewMode::Plot);
                chart::render_pane(
                    f,
                    panes[0],
                    &format!("RX {}:{}", dev.name, dev.port),
                    Styles::rx(),
                    &dev.rx_hist,
                    state.units,
                    dev.link_gbps,
                    filler,
                );
                chart::render_pane(
                    f,
                    panes[1],
                    &format!("TX {}:{}", dev.name, dev.port),
                    Styles::tx(),
                    &dev.tx_hist,
                    state.units,
                    dev.link_gbps,
                    filler,
                );
            }
            ViewMode::Data => data::render(f, *cell, dev, state.units),
            ViewMode::Info => info::render(f, *cell, dev),
        }
    }
}
