//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::border;

/// ASCII border set, renderable on dumb terminals and serial consoles.
pub const ASCII_BORDER: border::Set = border::Set {
    top_left: "+",
    top_right: "+",
    bottom_left: "+",
    bottom_right: "+",
    vertical_left: "|",
    vertical_right: "|",
    horizontal_top: "-",
    horizontal_bottom: "-",
};

/// Color palette.
pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Reset;
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;

    // Traffic direction colors
    pub const RX_COLOR: Color = Color::Cyan;
    pub const TX_COLOR: Color = Color::Red;

    // Header accents
    pub const TITLE_COLOR: Color = Color::Green;
    pub const FLAG_COLOR: Color = Color::Yellow;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Theme::FG).bg(Theme::BG)
    }

    /// Dimmed text style (axis labels, idle filler).
    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    /// Receive-direction style.
    pub fn rx() -> Style {
        Style::default().fg(Theme::RX_COLOR)
    }

    /// Transmit-direction style.
    pub fn tx() -> Style {
        Style::default().fg(Theme::TX_COLOR)
    }

    /// Program title style.
    pub fn title() -> Style {
        Style::default()
            .fg(Theme::TITLE_COLOR)
            .add_modifier(Modifier::BOLD)
    }

    /// Mode flag style ([PAUSED], [DATA], [INFO]).
    pub fn flag() -> Style {
        Style::default()
            .fg(Theme::FLAG_COLOR)
            .add_modifier(Modifier::BOLD)
    }

    /// Pane border style.
    pub fn border() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }
}
