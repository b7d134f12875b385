//! Color palettes and semantic styles, in light and dark variants.
//!
//! The active palette is chosen from the persisted [`Theme`] setting
//! and threaded into every render call; nothing here reads globals.

use ratatui::style::{Color, Modifier, Style};
use timewarden_config::Theme;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    /// Modal and overlay background.
    pub surface: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focused: Color,
    pub accent: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    /// Weekday bars in the usage chart.
    pub bar: Color,
    /// Weekend bars and weekend day labels.
    pub weekend: Color,
}

const DARK: Palette = Palette {
    bg: Color::Rgb(15, 23, 42),        // #0f172a
    surface: Color::Rgb(30, 41, 59),   // #1e293b
    text: Color::Rgb(226, 232, 240),   // #e2e8f0
    text_dim: Color::Rgb(100, 116, 139), // #64748b
    border: Color::Rgb(51, 65, 85),    // #334155
    border_focused: Color::Rgb(59, 130, 246), // #3b82f6
    accent: Color::Rgb(96, 165, 250),  // #60a5fa
    success: Color::Rgb(34, 197, 94),  // #22c55e
    error: Color::Rgb(239, 68, 68),    // #ef4444
    warning: Color::Rgb(245, 158, 11), // #f59e0b
    info: Color::Rgb(56, 189, 248),    // #38bdf8
    bar: Color::Rgb(59, 130, 246),     // #3b82f6
    weekend: Color::Rgb(245, 158, 11), // #f59e0b
};

const LIGHT: Palette = Palette {
    bg: Color::Rgb(248, 250, 252),     // #f8fafc
    surface: Color::Rgb(226, 232, 240), // #e2e8f0
    text: Color::Rgb(15, 23, 42),      // #0f172a
    text_dim: Color::Rgb(100, 116, 139), // #64748b
    border: Color::Rgb(203, 213, 225), // #cbd5e1
    border_focused: Color::Rgb(37, 99, 235), // #2563eb
    accent: Color::Rgb(37, 99, 235),   // #2563eb
    success: Color::Rgb(22, 163, 74),  // #16a34a
    error: Color::Rgb(220, 38, 38),    // #dc2626
    warning: Color::Rgb(217, 119, 6),  // #d97706
    info: Color::Rgb(2, 132, 199),     // #0284c7
    bar: Color::Rgb(37, 99, 235),      // #2563eb
    weekend: Color::Rgb(217, 119, 6),  // #d97706
};

impl Palette {
    pub fn for_theme(theme: Theme) -> &'static Self {
        match theme {
            Theme::Dark => &DARK,
            Theme::Light => &LIGHT,
        }
    }

    // ── Semantic styles ──────────────────────────────────────────────

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn border_default(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn body(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn table_header(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.surface)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_active(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn tab_inactive(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn key_hint(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn key_hint_key(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn badge_ok(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn badge_warn(&self) -> Style {
        Style::default().fg(self.warning).add_modifier(Modifier::BOLD)
    }

    pub fn input_active(&self) -> Style {
        Style::default().fg(self.text).bg(self.surface)
    }
}
