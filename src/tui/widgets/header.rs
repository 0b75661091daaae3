//! Header band: program title, clock, device identity, and mode flags.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;

use crate::device::Device;
use crate::tui::state::{SessionState, ViewMode};
use crate::tui::style::Styles;

const TITLE: &str = "ibmon";
const CLOCK_FMT: &str = "%B-%d-%Y %H:%M:%S";

/// Mode flags appended to the header, e.g. `[PAUSED] [DATA]`.
fn flags(state: &SessionState) -> String {
    let mut out = String::new();
    if state.paused {
        out.push_str(" [PAUSED]");
    }
    match state.view {
        ViewMode::Plot => {}
        ViewMode::Data => out.push_str(" [DATA]"),
        ViewMode::Info => out.push_str(" [INFO]"),
    }
    out
}

/// Four-row header for the single-device layout.
fn single_lines(dev: &Device, state: &SessionState, interval_secs: f64) -> Vec<Line<'static>> {
    let clock = Local::now().format(CLOCK_FMT).to_string();
    let link = dev.counters.link_layer.as_deref().unwrap_or("unknown");
    let rate = dev.counters.rate.as_deref().unwrap_or("unknown");
    vec![
        Line::from(vec![
            Span::styled(TITLE, Styles::title()),
            Span::styled(format!(" - {}", clock), Styles::default()),
            Span::styled(flags(state), Styles::flag()),
        ]),
        Line::from(Span::styled(
            format!(
                "Device: {} port {}   Link: {}   Rate: {}",
                dev.name, dev.port, link, rate
            ),
            Styles::default(),
        )),
        Line::from(Span::styled(
            format!(
                "Interval: {:.1}s   Units: {}   Samples: {}",
                interval_secs,
                state.units.label(),
                dev.rx_hist.len()
            ),
            Styles::default(),
        )),
        Line::from(Span::styled(
            "q quit  p pause  u units  d data  i info",
            Styles::dim(),
        )),
    ]
}

/// One-row header for the multi-device grid.
fn multi_line(n: usize, state: &SessionState, interval_secs: f64) -> Line<'static> {
    let clock = Local::now().format(CLOCK_FMT).to_string();
    Line::from(vec![
        Span::styled(TITLE, Styles::title()),
        Span::styled(
            format!(
                " - {}   {} devices   interval {:.1}s   units {}",
                clock,
                n,
                interval_secs,
                state.units.label()
            ),
            Styles::default(),
        ),
        Span::styled(flags(state), Styles::flag()),
    ])
}

pub fn render(
    f: &mut Frame,
    area: Rect,
    devices: &[Device],
    state: &SessionState,
    interval_secs: f64,
) {
    let text = if devices.len() == 1 {
        Text::from(single_lines(&devices[0], state, interval_secs))
    } else {
        Text::from(vec![multi_line(devices.len(), state, interval_secs)])
    };
    f.render_widget(Paragraph::new(text), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::state::Units;

    #[test]
    fn flags_reflect_mode_and_pause() {
        let mut s = SessionState::new(Units::Bits);
        assert_eq!(flags(&s), "");
        s.toggle_pause();
        assert_eq!(flags(&s), " [PAUSED]");
        s.toggle_data();
        assert_eq!(flags(&s), " [PAUSED] [DATA]");
        s.toggle_info();
        assert_eq!(flags(&s), " [PAUSED] [INFO]");
    }
}
