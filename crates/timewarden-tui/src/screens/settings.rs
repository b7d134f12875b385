//! Settings screen: password change, theme toggle, and logout.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use timewarden_config::Theme;

use crate::action::Action;
use crate::component::Component;
use crate::theme::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsRow {
    CurrentPassword,
    NewPassword,
    ConfirmPassword,
    ThemeToggle,
    Logout,
}

impl SettingsRow {
    const ALL: [SettingsRow; 5] = [
        Self::CurrentPassword,
        Self::NewPassword,
        Self::ConfirmPassword,
        Self::ThemeToggle,
        Self::Logout,
    ];

    fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&r| r == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|&r| r == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn is_password(self) -> bool {
        matches!(
            self,
            Self::CurrentPassword | Self::NewPassword | Self::ConfirmPassword
        )
    }
}

/// Outcome line under the password form.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Feedback {
    None,
    Success(String),
    Error(String),
}

pub struct SettingsScreen {
    active_row: SettingsRow,
    current: String,
    new: String,
    confirm: String,
    feedback: Feedback,
    submitting: bool,
    theme: Theme,
}

impl SettingsScreen {
    pub fn new(theme: Theme) -> Self {
        Self {
            active_row: SettingsRow::CurrentPassword,
            current: String::new(),
            new: String::new(),
            confirm: String::new(),
            feedback: Feedback::None,
            submitting: false,
            theme,
        }
    }

    fn active_input_mut(&mut self) -> Option<&mut String> {
        match self.active_row {
            SettingsRow::CurrentPassword => Some(&mut self.current),
            SettingsRow::NewPassword => Some(&mut self.new),
            SettingsRow::ConfirmPassword => Some(&mut self.confirm),
            _ => None,
        }
    }

    fn submit(&mut self) -> Option<Action> {
        if self.current.is_empty() || self.new.is_empty() || self.confirm.is_empty() {
            self.feedback = Feedback::Error("Fill in all password fields".to_owned());
            return None;
        }
        self.submitting = true;
        self.feedback = Feedback::None;
        Some(Action::ChangePassword {
            current: self.current.clone(),
            new: self.new.clone(),
            confirm: self.confirm.clone(),
        })
    }

    fn render_password_row(
        &self,
        frame: &mut Frame,
        area: Rect,
        palette: &Palette,
        label: &str,
        value: &str,
        row: SettingsRow,
    ) {
        let active = self.active_row == row;
        let label_style = if active {
            Style::default().fg(palette.accent)
        } else {
            palette.dim()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, label_style)),
            Rect::new(area.x, area.y, area.width, 1),
        );

        let masked = "\u{25CF}".repeat(value.chars().count());
        let text = if active {
            format!("{masked}\u{2588}")
        } else {
            masked
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if active {
                palette.focused_border()
            } else {
                palette.border_default()
            });
        let block_area = Rect::new(area.x, area.y + 1, area.width, 3);
        let inner = block.inner(block_area);
        frame.render_widget(block, block_area);
        frame.render_widget(Paragraph::new(Span::styled(text, palette.body())), inner);
    }
}

impl Component for SettingsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.submitting {
            return Ok(None);
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.active_row = self.active_row.next(),
            KeyCode::BackTab | KeyCode::Up => self.active_row = self.active_row.prev(),
            KeyCode::Enter => match self.active_row {
                SettingsRow::CurrentPassword | SettingsRow::NewPassword => {
                    self.active_row = self.active_row.next();
                }
                SettingsRow::ConfirmPassword => return Ok(self.submit()),
                SettingsRow::ThemeToggle => return Ok(Some(Action::ToggleTheme)),
                SettingsRow::Logout => return Ok(Some(Action::Logout)),
            },
            KeyCode::Backspace => {
                if let Some(input) = self.active_input_mut() {
                    input.pop();
                }
            }
            KeyCode::Char(c) if self.active_row.is_password() => {
                if let Some(input) = self.active_input_mut() {
                    input.push(c);
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::PasswordSettled(Ok(message)) => {
                self.submitting = false;
                self.current.clear();
                self.new.clear();
                self.confirm.clear();
                self.active_row = SettingsRow::CurrentPassword;
                self.feedback = Feedback::Success(message.clone());
            }
            Action::PasswordSettled(Err(message)) => {
                self.submitting = false;
                self.feedback = Feedback::Error(message.clone());
            }
            Action::ToggleTheme => {
                self.theme = self.theme.toggled();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .title(Line::styled(" Settings ", palette.title()))
            .borders(Borders::ALL)
            .border_style(palette.focused_border());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width.saturating_sub(4).min(44);
        let x = inner.x + 2;
        let mut y = inner.y + 1;

        frame.render_widget(
            Paragraph::new(Span::styled("Change Password", palette.title())),
            Rect::new(x, y, width, 1),
        );
        y += 2;

        for (label, value, row) in [
            (" Current password", &self.current, SettingsRow::CurrentPassword),
            (" New password", &self.new, SettingsRow::NewPassword),
            (" Confirm new password", &self.confirm, SettingsRow::ConfirmPassword),
        ] {
            if y + 4 > inner.y + inner.height {
                return;
            }
            self.render_password_row(frame, Rect::new(x, y, width, 4), palette, label, value, row);
            y += 4;
        }

        if y < inner.y + inner.height {
            let line = if self.submitting {
                Line::from(Span::styled("Saving\u{2026}", palette.dim()))
            } else {
                match &self.feedback {
                    Feedback::None => Line::from(""),
                    Feedback::Success(message) => Line::from(Span::styled(
                        message.as_str(),
                        Style::default().fg(palette.success),
                    )),
                    Feedback::Error(message) => Line::from(Span::styled(
                        message.as_str(),
                        Style::default().fg(palette.error),
                    )),
                }
            };
            frame.render_widget(Paragraph::new(line), Rect::new(x, y, width, 1));
            y += 2;
        }

        let theme_active = self.active_row == SettingsRow::ThemeToggle;
        if y < inner.y + inner.height {
            let theme_name = match self.theme {
                Theme::Dark => "Dark",
                Theme::Light => "Light",
            };
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(
                        if theme_active { "\u{25B8} " } else { "  " },
                        palette.body(),
                    ),
                    Span::styled("Theme: ", palette.body()),
                    Span::styled(theme_name, Style::default().fg(palette.accent)),
                    Span::styled("  (Enter to toggle)", palette.key_hint()),
                ]))
                .style(if theme_active {
                    palette.selected()
                } else {
                    Style::default()
                }),
                Rect::new(x, y, width, 1),
            );
            y += 2;
        }

        let logout_active = self.active_row == SettingsRow::Logout;
        if y < inner.y + inner.height {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(
                        if logout_active { "\u{25B8} " } else { "  " },
                        palette.body(),
                    ),
                    Span::styled("Log out", Style::default().fg(palette.error)),
                ]))
                .style(if logout_active {
                    palette.selected()
                } else {
                    Style::default()
                }),
                Rect::new(x, y, width, 1),
            );
        }
    }

    fn capturing_input(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    fn type_text(screen: &mut SettingsScreen, text: &str) {
        for c in text.chars() {
            screen
                .handle_key_event(KeyEvent::from(KeyCode::Char(c)))
                .unwrap();
        }
    }

    #[test]
    fn filled_form_submits_all_three_fields() {
        let mut screen = SettingsScreen::new(Theme::Dark);
        type_text(&mut screen, "old");
        screen.handle_key_event(KeyEvent::from(KeyCode::Enter)).unwrap();
        type_text(&mut screen, "new1");
        screen.handle_key_event(KeyEvent::from(KeyCode::Enter)).unwrap();
        type_text(&mut screen, "new1");
        let action = screen.handle_key_event(KeyEvent::from(KeyCode::Enter)).unwrap();

        match action {
            Some(Action::ChangePassword { current, new, confirm }) => {
                assert_eq!(current, "old");
                assert_eq!(new, "new1");
                assert_eq!(confirm, "new1");
            }
            other => panic!("expected ChangePassword, got {other:?}"),
        }
    }

    #[test]
    fn empty_fields_are_rejected_locally() {
        let mut screen = SettingsScreen::new(Theme::Dark);
        screen.handle_key_event(KeyEvent::from(KeyCode::Enter)).unwrap();
        screen.handle_key_event(KeyEvent::from(KeyCode::Enter)).unwrap();
        let action = screen.handle_key_event(KeyEvent::from(KeyCode::Enter)).unwrap();
        assert!(action.is_none());
        assert_eq!(
            screen.feedback,
            Feedback::Error("Fill in all password fields".to_owned())
        );
    }

    #[test]
    fn success_clears_the_form() {
        let mut screen = SettingsScreen::new(Theme::Dark);
        type_text(&mut screen, "old");
        screen.update(&Action::PasswordSettled(Ok(
            "Password changed successfully".to_owned(),
        ))).unwrap();

        assert!(screen.current.is_empty());
        assert_eq!(
            screen.feedback,
            Feedback::Success("Password changed successfully".to_owned())
        );
        assert!(!screen.submitting);
    }

    #[test]
    fn keys_are_ignored_while_submitting() {
        let mut screen = SettingsScreen::new(Theme::Dark);
        type_text(&mut screen, "old");
        screen.submitting = true;
        type_text(&mut screen, "more");
        assert_eq!(screen.current, "old");
    }
}
