//! Terminal User Interface
//!
//! ratatui front end for the quiz: one screen per game phase, plus
//! overlays for tips, badges and help.

pub mod app;
pub mod widgets;

pub use app::App;

use crate::game::MessageKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

/// Color scheme for the game
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub alert: Color,
    pub success: Color,
    pub warning: Color,
    pub info: Color,
    pub border: Color,
    pub header: Color,
    pub locked: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            accent: Color::Cyan,
            alert: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            info: Color::Blue,
            border: Color::DarkGray,
            header: Color::Magenta,
            locked: Color::DarkGray,
        }
    }
}

/// Color for a status-line message
pub fn message_color(kind: MessageKind, theme: &Theme) -> Color {
    match kind {
        MessageKind::Info => theme.info,
        MessageKind::Success => theme.success,
        MessageKind::Warning => theme.warning,
    }
}

/// Parse a `#RRGGBB` content color, falling back to `fallback`
pub fn hex_color(hex: &str, fallback: Color) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return fallback;
    }
    match u32::from_str_radix(digits, 16) {
        Ok(rgb) => Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8),
        Err(_) => fallback,
    }
}

/// Create a styled border block
pub fn styled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
}

/// ASCII art logo
pub const LOGO: &str = r#"
  ██████╗██╗   ██╗██████╗ ███████╗██████╗
 ██╔════╝╚██╗ ██╔╝██╔══██╗██╔════╝██╔══██╗
 ██║      ╚████╔╝ ██████╔╝█████╗  ██████╔╝
 ██║       ╚██╔╝  ██╔══██╗██╔══╝  ██╔══██╗
 ╚██████╗   ██║   ██████╔╝███████╗██║  ██║
  ╚═════╝   ╚═╝   ╚═════╝ ╚══════╝╚═╝  ╚═╝
          G U A R D I A N S
   Spot the threat. Make the safe call.
"#;

/// Smaller logo for header
pub const SMALL_LOGO: &str = " CYBER GUARDIANS ";

/// Help text
pub const HELP_TEXT: &str = r#"
╔═══════════════════════════════════════════════════════════════╗
║                       CONTROLS                                ║
╠═══════════════════════════════════════════════════════════════╣
║  ↑/↓   Navigate menus and answers                             ║
║  Enter Select / Confirm / Next line                           ║
║  1-9   Pick an answer directly                                ║
║  s     Skip the intro                                         ║
║  r     Retry a finished level                                 ║
║  t     Security tips (dashboard, level select)                ║
║  Esc   Go back / Abandon level                                ║
║  ?     Toggle this help                                       ║
║  q     Quit game                                              ║
╠═══════════════════════════════════════════════════════════════╣
║  Three wrong answers end the attempt.                         ║
║  Progress is saved automatically.                             ║
╚═══════════════════════════════════════════════════════════════╝
"#;

/// Create the main layout
pub fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // Header
            Constraint::Min(10),     // Main content
            Constraint::Length(3),   // Status bar
        ])
        .split(area)
        .to_vec()
}

/// Create the level layout (character panel + scenario area)
pub fn create_content_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),  // Character panel
            Constraint::Percentage(72),  // Scenario
        ])
        .split(area)
        .to_vec()
}

/// Create the scenario area layout (threat content + answers)
pub fn create_main_area_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55),  // Threat content
            Constraint::Percentage(45),  // Answers / explanation
        ])
        .split(area)
        .to_vec()
}

/// A `width` x `height` rect centered in `area`, shrunk to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_or_fall_back() {
        assert_eq!(hex_color("#FF4444", Color::White), Color::Rgb(0xFF, 0x44, 0x44));
        assert_eq!(hex_color("00D4FF", Color::White), Color::Rgb(0x00, 0xD4, 0xFF));
        assert_eq!(hex_color("#xyz", Color::White), Color::White);
        assert_eq!(hex_color("#GGGGGG", Color::Red), Color::Red);
    }

    #[test]
    fn centered_rect_fits_inside_small_areas() {
        let area = Rect::new(0, 0, 20, 10);
        let popup = centered_rect(70, 25, area);
        assert_eq!(popup, Rect::new(2, 2, 16, 6));

        let tiny = centered_rect(10, 10, Rect::new(0, 0, 3, 3));
        assert_eq!((tiny.width, tiny.height), (0, 0));
    }
}
