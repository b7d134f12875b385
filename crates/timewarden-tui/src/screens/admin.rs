//! Admin screen: the full user table with add, validate, and delete.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table};
use timewarden_api::UserSummary;
use timewarden_core::AdminState;

use crate::action::Action;
use crate::component::Component;
use crate::theme::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddField {
    Username,
    SystemIp,
}

/// The add-user form, open as a modal over the table.
struct AddForm {
    active_field: AddField,
    username: String,
    system_ip: String,
    error: Option<&'static str>,
}

impl AddForm {
    fn new() -> Self {
        Self {
            active_field: AddField::Username,
            username: String::new(),
            system_ip: String::new(),
            error: None,
        }
    }

    fn active_input_mut(&mut self) -> &mut String {
        match self.active_field {
            AddField::Username => &mut self.username,
            AddField::SystemIp => &mut self.system_ip,
        }
    }

    fn toggle_field(&mut self) {
        self.active_field = match self.active_field {
            AddField::Username => AddField::SystemIp,
            AddField::SystemIp => AddField::Username,
        };
    }
}

pub struct AdminScreen {
    state: AdminState,
    selected: usize,
    add_form: Option<AddForm>,
}

impl AdminScreen {
    pub fn new() -> Self {
        Self {
            state: AdminState::Loading,
            selected: 0,
            add_form: None,
        }
    }

    fn users(&self) -> &[UserSummary] {
        match &self.state {
            AdminState::Ready(users) => users,
            _ => &[],
        }
    }

    fn selected_user(&self) -> Option<&UserSummary> {
        self.users().get(self.selected)
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.users().len();
        if len == 0 {
            return;
        }
        let current = self.selected.min(len - 1);
        self.selected = current.saturating_add_signed(delta).min(len - 1);
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char('r') => return Some(Action::RefreshAdmin),
            KeyCode::Char('a') => self.add_form = Some(AddForm::new()),
            KeyCode::Char('v') => {
                let user = self.selected_user()?;
                return Some(Action::ValidateUser(user.id));
            }
            KeyCode::Char('d') => {
                let user = self.selected_user()?;
                return Some(Action::RequestDeleteUser {
                    user_id: user.id,
                    username: user.username.clone(),
                });
            }
            _ => {}
        }
        None
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        let form = self.add_form.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.add_form = None;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
            KeyCode::Enter => {
                if form.active_field == AddField::Username {
                    form.active_field = AddField::SystemIp;
                    return None;
                }
                if form.username.is_empty() || form.system_ip.is_empty() {
                    form.error = Some("Enter a username and system IP");
                    return None;
                }
                let action = Action::AddUser {
                    username: form.username.clone(),
                    system_ip: form.system_ip.clone(),
                };
                self.add_form = None;
                return Some(action);
            }
            KeyCode::Backspace => {
                form.active_input_mut().pop();
            }
            KeyCode::Char(c) => {
                form.active_input_mut().push(c);
            }
            _ => {}
        }
        None
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let users = self.users();
        let header = Row::new(vec![
            Cell::from("Username"),
            Cell::from("System IP"),
            Cell::from("Status"),
            Cell::from("Last Checked"),
        ])
        .style(palette.table_header());

        let rows: Vec<Row> = users
            .iter()
            .enumerate()
            .map(|(i, user)| {
                let status = if user.is_valid {
                    Cell::from(Span::styled("Valid", palette.badge_ok()))
                } else {
                    Cell::from(Span::styled("Invalid", Style::default().fg(palette.error)))
                };
                let row = Row::new(vec![
                    Cell::from(user.username.clone()),
                    Cell::from(user.system_ip.clone()),
                    status,
                    Cell::from(user.last_checked.clone().unwrap_or_else(|| "Never".to_owned())),
                ]);
                if i == self.selected {
                    row.style(palette.selected())
                } else {
                    row.style(palette.body())
                }
            })
            .collect();

        let block = Block::default()
            .title(Line::styled(" Admin \u{2014} Users ", palette.title()))
            .borders(Borders::ALL)
            .border_style(palette.focused_border());
        let table = Table::new(
            rows,
            [
                Constraint::Min(14),
                Constraint::Length(16),
                Constraint::Length(8),
                Constraint::Min(20),
            ],
        )
        .header(header)
        .block(block);
        frame.render_widget(table, area);
    }

    fn render_add_form(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Some(form) = &self.add_form else {
            return;
        };
        let panel = centered(area, 46, 13);
        frame.render_widget(Clear, panel);

        let block = Block::default()
            .title(Line::styled(" Add User ", palette.title()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.focused_border())
            .style(Style::default().bg(palette.surface));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        render_input(
            frame,
            Rect::new(inner.x + 1, inner.y + 1, inner.width.saturating_sub(2), 4),
            palette,
            " Username",
            &form.username,
            form.active_field == AddField::Username,
        );
        render_input(
            frame,
            Rect::new(inner.x + 1, inner.y + 5, inner.width.saturating_sub(2), 4),
            palette,
            " System IP",
            &form.system_ip,
            form.active_field == AddField::SystemIp,
        );

        let footer = Rect::new(inner.x + 1, inner.y + 9, inner.width.saturating_sub(2), 1);
        if let Some(error) = form.error {
            frame.render_widget(
                Paragraph::new(Span::styled(error, Style::default().fg(palette.error))),
                footer,
            );
        } else {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("Enter ", palette.key_hint_key()),
                    Span::styled("add  ", palette.key_hint()),
                    Span::styled("Esc ", palette.key_hint_key()),
                    Span::styled("cancel", palette.key_hint()),
                ])),
                footer,
            );
        }
    }
}

impl Component for AdminScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.add_form.is_some() {
            return Ok(self.handle_form_key(key));
        }
        Ok(self.handle_table_key(key))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::AdminLoaded(state) = action {
            if let AdminState::Ready(users) = state {
                self.selected = self.selected.min(users.len().saturating_sub(1));
            }
            self.state = state.clone();
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        match &self.state {
            AdminState::Loading => {
                frame.render_widget(
                    Paragraph::new(Span::styled(" Loading\u{2026}", palette.dim())),
                    area,
                );
            }
            AdminState::Failed => {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        " Failed to load admin data. Press r to retry.",
                        Style::default().fg(palette.error),
                    )),
                    area,
                );
            }
            AdminState::Ready(_) => self.render_table(frame, area, palette),
        }

        self.render_add_form(frame, area, palette);
    }

    fn capturing_input(&self) -> bool {
        self.add_form.is_some()
    }
}

fn render_input(
    frame: &mut Frame,
    area: Rect,
    palette: &Palette,
    label: &str,
    value: &str,
    active: bool,
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

    let text = if active {
        format!("{value}\u{2588}")
    } else {
        value.to_owned()
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

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    fn user(id: i64, username: &str) -> UserSummary {
        UserSummary {
            id,
            username: username.to_owned(),
            system_ip: "192.168.1.20".to_owned(),
            time_left: None,
            last_checked: None,
            pending_adjustment: None,
            pending_schedule: false,
            is_valid: true,
        }
    }

    #[test]
    fn selection_survives_a_shrinking_reload() {
        let mut screen = AdminScreen::new();
        screen
            .update(&Action::AdminLoaded(AdminState::Ready(vec![
                user(1, "a"),
                user(2, "b"),
                user(3, "c"),
            ])))
            .unwrap();
        screen.move_selection(2);
        assert_eq!(screen.selected, 2);

        screen
            .update(&Action::AdminLoaded(AdminState::Ready(vec![user(1, "a")])))
            .unwrap();
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn add_form_captures_input_and_submits() {
        let mut screen = AdminScreen::new();
        assert!(!screen.capturing_input());

        screen
            .handle_key_event(KeyEvent::from(KeyCode::Char('a')))
            .unwrap();
        assert!(screen.capturing_input());

        for c in "kid".chars() {
            screen
                .handle_key_event(KeyEvent::from(KeyCode::Char(c)))
                .unwrap();
        }
        screen.handle_key_event(KeyEvent::from(KeyCode::Tab)).unwrap();
        for c in "10.0.0.5".chars() {
            screen
                .handle_key_event(KeyEvent::from(KeyCode::Char(c)))
                .unwrap();
        }
        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Enter))
            .unwrap();

        match action {
            Some(Action::AddUser { username, system_ip }) => {
                assert_eq!(username, "kid");
                assert_eq!(system_ip, "10.0.0.5");
            }
            other => panic!("expected AddUser, got {other:?}"),
        }
        assert!(!screen.capturing_input());
    }

    #[test]
    fn empty_form_is_rejected_locally() {
        let mut screen = AdminScreen::new();
        screen
            .handle_key_event(KeyEvent::from(KeyCode::Char('a')))
            .unwrap();
        screen.handle_key_event(KeyEvent::from(KeyCode::Tab)).unwrap();
        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Enter))
            .unwrap();
        assert!(action.is_none());
        assert!(screen.capturing_input());
    }
}
