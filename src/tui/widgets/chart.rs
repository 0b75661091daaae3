//! Scrolling rate chart: right-anchored vertical bars under an auto-scaled
//! axis.
//!
//! The bar geometry is computed by pure functions over a window of
//! display-unit values, so scaling and anchoring are testable without a
//! terminal. Rendering wraps the rows in a bordered [`Paragraph`].

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::fmt;
use crate::history::HistoryBuffer;
use crate::tui::state::Units;
use crate::tui::style::{ASCII_BORDER, Styles};

/// Width of the axis label gutter to the left of the bars.
pub const AXIS_WIDTH: usize = 12;

const BAR: char = '|';
const FILLER: char = '.';

/// Axis ceiling for a window of display-unit values.
///
/// The ceiling is the window maximum with a floor of 1.0 so an idle chart
/// still has a sane axis. When displaying bits the ceiling is additionally
/// clamped to the nominal link rate, which keeps one spurious spike from
/// flattening the rest of the chart. Byte mode is left unclamped since the
/// link rate is quoted in bits.
pub fn scale_ceiling(display_window: &[f64], units: Units, link_gbps: f64) -> f64 {
    let mut ceiling = display_window.iter().copied().fold(1.0_f64, f64::max);
    if units == Units::Bits && link_gbps > 0.0 {
        let link_bps = link_gbps * 1e9;
        if ceiling > link_bps {
            ceiling = link_bps;
        }
    }
    ceiling
}

/// Bar height in rows for one value, rounded to the nearest row and
/// clipped to the pane.
fn bar_height(value: f64, ceiling: f64, height: usize) -> usize {
    (((value / ceiling) * height as f64).round() as usize).min(height)
}

/// Builds the bar rows, top row first, each exactly `width` chars.
///
/// The newest value hugs the right edge; columns older than the window (or
/// never sampled) are filler. `filler` false blanks the idle space above
/// the bars, used on view switches where no fresh sample backs the frame.
pub fn chart_rows(
    display_window: &[f64],
    ceiling: f64,
    width: usize,
    height: usize,
    filler: bool,
) -> Vec<String> {
    let idle = if filler { FILLER } else { ' ' };
    let shown = &display_window[display_window.len().saturating_sub(width)..];
    let pad = width - shown.len();
    let heights: Vec<usize> = shown
        .iter()
        .map(|&v| bar_height(v, ceiling, height))
        .collect();

    (0..height)
        .map(|row| {
            let from_bottom = height - row;
            let mut s = String::with_capacity(width);
            for _ in 0..pad {
                s.push(idle);
            }
            for &bh in &heights {
                s.push(if bh >= from_bottom { BAR } else { idle });
            }
            s
        })
        .collect()
}

/// Splits one bar row into styled spans: bars in the direction color,
/// everything else dim.
fn row_spans(row: &str, bar_style: ratatui::style::Style) -> Line<'static> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_is_bar = false;
    for c in row.chars() {
        let is_bar = c == BAR;
        if is_bar != run_is_bar && !run.is_empty() {
            let style = if run_is_bar { bar_style } else { Styles::dim() };
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        run_is_bar = is_bar;
        run.push(c);
    }
    if !run.is_empty() {
        let style = if run_is_bar { bar_style } else { Styles::dim() };
        spans.push(Span::styled(run, style));
    }
    Line::from(spans)
}

/// Renders one direction's chart pane: border, latest-rate title, axis
/// gutter, and the bar field.
#[allow(clippy::too_many_arguments)]
pub fn render_pane(
    f: &mut Frame,
    area: Rect,
    title: &str,
    bar_style: ratatui::style::Style,
    hist: &HistoryBuffer,
    units: Units,
    link_gbps: f64,
    filler: bool,
) {
    let latest = hist.latest().unwrap_or(0.0);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(ASCII_BORDER)
        .border_style(Styles::border())
        .title(format!(" {}  {} ", title, fmt::human_rate(latest, units)));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width as usize <= AXIS_WIDTH || inner.height == 0 {
        return;
    }

    let h = inner.height as usize;
    let w = inner.width as usize - AXIS_WIDTH;
    let window: Vec<f64> = hist
        .window(w)
        .into_iter()
        .map(|v| units.from_bytes_per_sec(v))
        .collect();
    let ceiling = scale_ceiling(&window, units, link_gbps);
    let rows = chart_rows(&window, ceiling, w, h, filler);

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let label = if r == 0 {
                fmt::scale_label(ceiling, units)
            } else if r == h / 2 && h > 2 {
                fmt::scale_label(ceiling / 2.0, units)
            } else if r == h - 1 {
                fmt::zero_label(units).to_string()
            } else {
                String::new()
            };
            let mut line = row_spans(row, bar_style);
            line.spans
                .insert(0, Span::styled(format!("{:<AXIS_WIDTH$}", label), Styles::dim()));
            line
        })
        .collect();
    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}
