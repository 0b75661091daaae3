//! Data view: raw counter values in RX / TX / Other panels.
//!
//! Values come from the device's last successful reading and the extras
//! snapshot refreshed by the loop; nothing is read from sysfs here.

use std::path::Path;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::device::Device;
use crate::fmt;
use crate::tui::layout::stacked_panes;
use crate::tui::state::{Units, ViewMode};
use crate::tui::style::{ASCII_BORDER, Styles};

fn counter_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn counter_line(label: &str, value: u64) -> Line<'static> {
    Line::from(Span::styled(
        format!("{:<28} {:>20}", label, value),
        Styles::default(),
    ))
}

fn rate_line(label: &str, text: String, style: ratatui::style::Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<28} ", label), Styles::dim()),
        Span::styled(text, style),
    ])
}

fn render_panel(
    f: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<Line<'static>>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(ASCII_BORDER)
        .border_style(Styles::border())
        .title(format!(" {} ", title));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}

pub fn render(f: &mut Frame, area: Rect, dev: &Device, units: Units) {
    let panes = stacked_panes(area, ViewMode::Data);
    let raw = dev.raw();

    let mut rx = vec![
        counter_line(&counter_name(&dev.counters.rx_data), raw.rx_data),
        counter_line(&counter_name(&dev.counters.rx_pkts), raw.rx_pkts),
        rate_line("rate", fmt::human_rate(dev.current.rx_bytes_per_sec, units), Styles::rx()),
        rate_line("packets", fmt::human_pps(dev.current.rx_pkts_per_sec), Styles::rx()),
    ];
    rx.extend(dev.extras.rx.iter().map(|(l, v)| counter_line(l, *v)));

    let mut tx = vec![
        counter_line(&counter_name(&dev.counters.tx_data), raw.tx_data),
        counter_line(&counter_name(&dev.counters.tx_pkts), raw.tx_pkts),
        rate_line("rate", fmt::human_rate(dev.current.tx_bytes_per_sec, units), Styles::tx()),
        rate_line("packets", fmt::human_pps(dev.current.tx_pkts_per_sec), Styles::tx()),
    ];
    tx.extend(dev.extras.tx.iter().map(|(l, v)| counter_line(l, *v)));

    let other: Vec<Line<'static>> = if dev.extras.other.is_empty() {
        vec![Line::from(Span::styled("no optional counters", Styles::dim()))]
    } else {
        dev.extras.other.iter().map(|(l, v)| counter_line(l, *v)).collect()
    };

    render_panel(f, panes[0], &format!("RX {}:{}", dev.name, dev.port), rx);
    render_panel(f, panes[1], &format!("TX {}:{}", dev.name, dev.port), tx);
    render_panel(f, panes[2], "Other", other);
}
