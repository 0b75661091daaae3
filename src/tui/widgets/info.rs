//! Info view: link attributes and the populated GID table rows.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::device::Device;
use crate::tui::style::{ASCII_BORDER, Styles};

/// Rows reserved above the GID table for the link attribute summary.
const ATTR_ROWS: u16 = 2;

pub fn render(f: &mut Frame, area: Rect, dev: &Device) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(ASCII_BORDER)
        .border_style(Styles::border())
        .title(format!(" Info {}:{} ", dev.name, dev.port));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height <= ATTR_ROWS {
        return;
    }

    let link = dev.counters.link_layer.as_deref().unwrap_or("unknown");
    let rate = dev.counters.rate.as_deref().unwrap_or("unknown");
    let attrs = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Link layer: {}   Rate: {}", link, rate),
            Styles::default(),
        )),
        Line::from(Span::styled(
            format!("GID entries: {}", dev.gids.len()),
            Styles::dim(),
        )),
    ]);
    f.render_widget(
        attrs,
        Rect::new(inner.x, inner.y, inner.width, ATTR_ROWS),
    );

    let table_area = Rect::new(
        inner.x,
        inner.y + ATTR_ROWS,
        inner.width,
        inner.height - ATTR_ROWS,
    );
    let rows: Vec<Row> = dev
        .gids
        .iter()
        .map(|g| {
            Row::new(vec![
                Cell::from(g.index.to_string()),
                Cell::from(g.gid.clone()),
                Cell::from(g.gid_type.clone()),
                Cell::from(g.ndev.clone()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(46),
            Constraint::Length(12),
            Constraint::Fill(1),
        ],
    )
    .header(
        Row::new(vec!["IDX", "GID", "TYPE", "NETDEV"]).style(Styles::dim()),
    );
    f.render_widget(table, table_area);
}
