//! Custom widgets for the game UI

use crate::data::ScenarioKind;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// Labelled progress bar for campaign and level progress
pub struct ProgressBar {
    value: u32,
    max: u32,
    label: String,
    color: Color,
}

impl ProgressBar {
    pub fn new(label: &str, value: u32, max: u32) -> Self {
        Self {
            value,
            max,
            label: label.to_string(),
            color: Color::Green,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Widget for ProgressBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }

        let label = format!("{}: {}/{}", self.label, self.value, self.max);
        buf.set_string(area.x, area.y, &label, Style::default().fg(self.color));

        if area.height > 1 {
            let inner = area.width - 2;
            let filled = if self.max == 0 {
                0
            } else {
                (self.value.min(self.max) as u64 * inner as u64 / self.max as u64) as u16
            };

            let bar_y = area.y + 1;
            buf.set_string(area.x, bar_y, "[", Style::default());
            buf.set_string(area.x + area.width - 1, bar_y, "]", Style::default());
            for x in 0..filled {
                buf.set_string(area.x + 1 + x, bar_y, "█", Style::default().fg(self.color));
            }
            for x in filled..inner {
                buf.set_string(area.x + 1 + x, bar_y, "░", Style::default().fg(Color::DarkGray));
            }
        }
    }
}

/// Remaining lives as hearts
pub struct LivesIndicator {
    lives: u8,
    max: u8,
}

impl LivesIndicator {
    pub fn new(lives: u8, max: u8) -> Self {
        Self { lives, max }
    }
}

impl Widget for LivesIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }
        let color = match self.lives {
            0 | 1 => Color::Red,
            2 => Color::Yellow,
            _ => Color::Green,
        };
        let mut x = area.x;
        for i in 0..self.max {
            if x + 2 > area.x + area.width {
                break;
            }
            let (heart, style) = if i < self.lives {
                ("♥", Style::default().fg(color))
            } else {
                ("♡", Style::default().fg(Color::DarkGray))
            };
            buf.set_string(x, area.y, heart, style);
            x += 2;
        }
    }
}

/// Flashing "threat detected" banner shown when a scenario appears
pub struct ThreatAlert {
    kind: ScenarioKind,
    blink: bool,
}

impl ThreatAlert {
    pub fn new(kind: ScenarioKind) -> Self {
        Self { kind, blink: true }
    }

    pub fn blink(mut self, blink: bool) -> Self {
        self.blink = blink;
        self
    }
}

impl Widget for ThreatAlert {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
        if self.blink {
            style = style.add_modifier(Modifier::SLOW_BLINK);
        }
        let text = format!("⚠ THREAT DETECTED: {} {}", self.kind.symbol(), self.kind.label());
        buf.set_stringn(area.x, area.y, &text, area.width as usize, style);
    }
}

/// ASCII art box for dramatic moments
pub struct DramaticBox {
    title: String,
    content: Vec<String>,
    border_color: Color,
}

impl DramaticBox {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Vec::new(),
            border_color: Color::Red,
        }
    }

    pub fn content(mut self, lines: Vec<String>) -> Self {
        self.content = lines;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }
}

impl Widget for DramaticBox {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let style = Style::default().fg(self.border_color);
        let right = area.x + area.width - 1;
        let bottom = area.y + area.height - 1;

        // Double-line border
        buf.set_string(area.x, area.y, "╔", style);
        buf.set_string(right, area.y, "╗", style);
        buf.set_string(area.x, bottom, "╚", style);
        buf.set_string(right, bottom, "╝", style);
        for x in area.x + 1..right {
            buf.set_string(x, area.y, "═", style);
            buf.set_string(x, bottom, "═", style);
        }
        for y in area.y + 1..bottom {
            buf.set_string(area.x, y, "║", style);
            buf.set_string(right, y, "║", style);
        }

        let title = format!(" {} ", self.title);
        let title_width = title.chars().count() as u16;
        if title_width < area.width {
            let start = area.x + (area.width - title_width) / 2;
            buf.set_string(start, area.y, &title, style.add_modifier(Modifier::BOLD));
        }

        let inner_width = area.width.saturating_sub(4) as usize;
        for (i, line) in self.content.iter().enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= bottom {
                break;
            }
            buf.set_stringn(area.x + 2, y, line, inner_width, Style::default().fg(Color::White));
        }
    }
}
