//! Login screen — the landing page whenever no session is valid.
//!
//! Captures all keys except Ctrl+C. Errors render inline under the
//! form, exactly where the user is looking.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::action::Action;
use crate::component::Component;
use crate::theme::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
    Username,
    Password,
}

pub struct LoginScreen {
    active_field: LoginField,
    username: String,
    password: String,
    /// Inline error from the last failed attempt.
    error: Option<String>,
    /// Set while a login request is in flight.
    submitting: bool,
}

impl LoginScreen {
    pub fn new() -> Self {
        Self {
            active_field: LoginField::Username,
            username: String::new(),
            password: String::new(),
            error: None,
            submitting: false,
        }
    }

    fn active_input_mut(&mut self) -> &mut String {
        match self.active_field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    fn toggle_field(&mut self) {
        self.active_field = match self.active_field {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    fn clear(&mut self) {
        self.username.clear();
        self.password.clear();
        self.active_field = LoginField::Username;
        self.error = None;
        self.submitting = false;
    }

    fn render_input(
        frame: &mut Frame,
        area: Rect,
        palette: &Palette,
        label: &str,
        value: &str,
        active: bool,
        masked: bool,
    ) {
        if area.height < 4 {
            return;
        }

        let label_style = if active {
            Style::default().fg(palette.accent)
        } else {
            palette.dim()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, label_style)),
            Rect::new(area.x, area.y, area.width, 1),
        );

        let display = if masked {
            "\u{25CF}".repeat(value.chars().count())
        } else {
            value.to_owned()
        };
        let text = if active {
            format!("{display}\u{2588}")
        } else {
            display
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

impl Component for LoginScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.submitting {
            return Ok(None);
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.toggle_field();
            }
            KeyCode::Enter => {
                if self.active_field == LoginField::Username {
                    self.active_field = LoginField::Password;
                    return Ok(None);
                }
                if self.username.is_empty() || self.password.is_empty() {
                    self.error = Some("Enter a username and password".to_owned());
                    return Ok(None);
                }
                self.submitting = true;
                self.error = None;
                return Ok(Some(Action::LoginSubmit {
                    username: self.username.clone(),
                    password: self.password.clone(),
                }));
            }
            KeyCode::Backspace => {
                self.active_input_mut().pop();
            }
            KeyCode::Char(c) => {
                self.active_input_mut().push(c);
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LoginFailed(message) => {
                self.submitting = false;
                self.password.clear();
                self.active_field = LoginField::Password;
                self.error = Some(message.clone());
            }
            // Leaving the login page means the attempt succeeded or the
            // session was restored; drop whatever was typed.
            Action::ShowPage(page) if *page != timewarden_core::Page::Login => {
                self.clear();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let panel_w = 46u16.min(area.width.saturating_sub(4));
        let panel_h = 14u16.min(area.height.saturating_sub(2));
        let x = (area.width.saturating_sub(panel_w)) / 2;
        let y = (area.height.saturating_sub(panel_h)) / 2;
        let panel = Rect::new(area.x + x, area.y + y, panel_w, panel_h);

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled("Timewarden", palette.title()),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.focused_border());
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let chunks = Layout::vertical([
            Constraint::Length(4), // Username
            Constraint::Length(4), // Password
            Constraint::Length(1), // Error line
            Constraint::Length(1), // Hint
            Constraint::Min(0),
        ])
        .split(Rect::new(
            inner.x + 1,
            inner.y + 1,
            inner.width.saturating_sub(2),
            inner.height.saturating_sub(1),
        ));

        Self::render_input(
            frame,
            chunks[0],
            palette,
            " Username",
            &self.username,
            self.active_field == LoginField::Username,
            false,
        );
        Self::render_input(
            frame,
            chunks[1],
            palette,
            " Password",
            &self.password,
            self.active_field == LoginField::Password,
            true,
        );

        if self.submitting {
            frame.render_widget(
                Paragraph::new(Span::styled(" Signing in\u{2026}", palette.dim())),
                chunks[2],
            );
        } else if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" {error}"),
                    Style::default().fg(palette.error),
                )),
                chunks[2],
            );
        }

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Tab ", palette.key_hint_key()),
                Span::styled("switch field  ", palette.key_hint()),
                Span::styled("Enter ", palette.key_hint_key()),
                Span::styled("sign in", palette.key_hint()),
            ])),
            chunks[3],
        );
    }

    fn capturing_input(&self) -> bool {
        true
    }
}
