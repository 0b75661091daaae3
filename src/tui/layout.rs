//! Panel geometry: the header band, stacked single-device panes, and the
//! near-square multi-device grid.
//!
//! Geometry is derived state. [`LayoutManager`] recomputes it only when one
//! of its inputs (terminal area, device count, view mode) changes, and
//! rebuilds the whole set of rectangles rather than patching it.

use ratatui::layout::Rect;

use super::state::ViewMode;

/// Header height in the single-device layout (title, device line, interval
/// line, border).
pub const SINGLE_HEADER_ROWS: u16 = 4;
/// Header height in the multi-device layout (one status line).
pub const MULTI_HEADER_ROWS: u16 = 1;

/// Computed panel rectangles for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Geometry {
    pub header: Rect,
    /// One rectangle per device. A single device gets the whole body.
    pub cells: Vec<Rect>,
}

/// Grid dimensions for `n` devices: columns = ⌈√n⌉, rows = ⌈n / columns⌉.
pub fn grid_dims(n: usize) -> (u16, u16) {
    if n <= 1 {
        return (1, 1);
    }
    let cols = (n as f64).sqrt().ceil() as u16;
    let rows = (n as u16).div_ceil(cols);
    (cols, rows)
}

/// Splits `area` into `n` grid cells. The last row and last column absorb
/// the integer-division remainder so the grid always covers the area.
pub fn grid_cells(area: Rect, n: usize) -> Vec<Rect> {
    let (cols, rows) = grid_dims(n);
    let cell_h = area.height / rows;
    let cell_w = area.width / cols;
    (0..n as u16)
        .map(|i| {
            let r = i / cols;
            let c = i % cols;
            let y = area.y + r * cell_h;
            let x = area.x + c * cell_w;
            let h = if r == rows - 1 {
                area.height - r * cell_h
            } else {
                cell_h
            };
            let w = if c == cols - 1 {
                area.width - c * cell_w
            } else {
                cell_w
            };
            Rect::new(x, y, w, h)
        })
        .collect()
}

/// Splits a device cell into the stacked panes for the active view:
/// Plot = RX + TX halves, Data = RX + TX + Other thirds (last absorbs the
/// remainder), Info = one full pane.
pub fn stacked_panes(area: Rect, view: ViewMode) -> Vec<Rect> {
    match view {
        ViewMode::Plot => {
            let rx_h = area.height / 2;
            vec![
                Rect::new(area.x, area.y, area.width, rx_h),
                Rect::new(area.x, area.y + rx_h, area.width, area.height - rx_h),
            ]
        }
        ViewMode::Data => {
            let each = area.height / 3;
            vec![
                Rect::new(area.x, area.y, area.width, each),
                Rect::new(area.x, area.y + each, area.width, each),
                Rect::new(
                    area.x,
                    area.y + 2 * each,
                    area.width,
                    area.height - 2 * each,
                ),
            ]
        }
        ViewMode::Info => vec![area],
    }
}

fn compute(area: Rect, devices: usize, _view: ViewMode) -> Geometry {
    let hdr_h = if devices > 1 {
        MULTI_HEADER_ROWS
    } else {
        SINGLE_HEADER_ROWS
    }
    .min(area.height);
    let header = Rect::new(area.x, area.y, area.width, hdr_h);
    let body = Rect::new(area.x, area.y + hdr_h, area.width, area.height - hdr_h);
    let cells = if devices > 1 {
        grid_cells(body, devices)
    } else {
        vec![body]
    };
    Geometry { header, cells }
}

/// Caches the derived geometry and the inputs it was computed from.
#[derive(Debug, Default)]
pub struct LayoutManager {
    inputs: Option<(Rect, usize, ViewMode)>,
    geometry: Geometry,
    /// Bumped on every recompute.
    pub generation: u64,
}

impl LayoutManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the geometry for the given inputs, recomputing only when the
    /// terminal area, device count, or view mode changed.
    pub fn update(&mut self, area: Rect, devices: usize, view: ViewMode) -> &Geometry {
        if self.inputs != Some((area, devices, view)) {
            self.geometry = compute(area, devices, view);
            self.inputs = Some((area, devices, view));
            self.generation += 1;
        }
        &self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dimensions() {
        assert_eq!(grid_dims(1), (1, 1));
        assert_eq!(grid_dims(2), (2, 1));
        assert_eq!(grid_dims(4), (2, 2));
        assert_eq!(grid_dims(5), (3, 2));
        assert_eq!(grid_dims(9), (3, 3));
        assert_eq!(grid_dims(10), (4, 3));
    }

    #[test]
    fn grid_cells_cover_area_with_remainder() {
        let area = Rect::new(0, 1, 101, 50);
        let cells = grid_cells(area, 5);
        assert_eq!(cells.len(), 5);
        // 3 columns of 33 wide; last column absorbs 101 - 66 = 35.
        assert_eq!(cells[0].width, 33);
        assert_eq!(cells[2].width, 35);
        // 2 rows of 25 high, no remainder.
        assert_eq!(cells[0].height, 25);
        assert_eq!(cells[4].height, 25);
        // Last cell sits in the second row, second column.
        assert_eq!(cells[4].x, 33);
        assert_eq!(cells[4].y, 26);
    }

    #[test]
    fn stacked_plot_halves() {
        let area = Rect::new(0, 4, 80, 21);
        let panes = stacked_panes(area, ViewMode::Plot);
        assert_eq!(panes.len(), 2);
        assert_eq!(panes[0].height, 10);
        assert_eq!(panes[1].height, 11);
        assert_eq!(panes[1].y, 14);
    }

    #[test]
    fn stacked_data_thirds() {
        let area = Rect::new(0, 4, 80, 20);
        let panes = stacked_panes(area, ViewMode::Data);
        assert_eq!(panes.len(), 3);
        assert_eq!(panes[0].height, 6);
        assert_eq!(panes[1].height, 6);
        assert_eq!(panes[2].height, 8);
    }

    #[test]
    fn info_takes_full_body() {
        let area = Rect::new(0, 4, 80, 20);
        assert_eq!(stacked_panes(area, ViewMode::Info), vec![area]);
    }

    #[test]
    fn single_device_geometry() {
        let mut lm = LayoutManager::new();
        let g = lm.update(Rect::new(0, 0, 80, 24), 1, ViewMode::Plot).clone();
        assert_eq!(g.header.height, SINGLE_HEADER_ROWS);
        assert_eq!(g.cells.len(), 1);
        assert_eq!(g.cells[0].y, SINGLE_HEADER_ROWS);
        assert_eq!(g.cells[0].height, 20);
    }

    #[test]
    fn recompute_only_on_input_change() {
        let mut lm = LayoutManager::new();
        let area = Rect::new(0, 0, 80, 24);
        lm.update(area, 2, ViewMode::Plot);
        assert_eq!(lm.generation, 1);
        lm.update(area, 2, ViewMode::Plot);
        assert_eq!(lm.generation, 1);
        lm.update(area, 2, ViewMode::Data);
        assert_eq!(lm.generation, 2);
        lm.update(Rect::new(0, 0, 100, 30), 2, ViewMode::Data);
        assert_eq!(lm.generation, 3);
    }
}
