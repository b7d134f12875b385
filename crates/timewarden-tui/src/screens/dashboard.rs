//! Dashboard screen: the user roster with sync badges and usage
//! charts, plus the time-adjustment and schedule-editor modals.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph};
use timewarden_api::Day;
use timewarden_core::dashboard::ChartState;
use timewarden_core::flows::{HOURS_STEP, ZERO_DELTA};
use timewarden_core::{
    Dashboard, DashboardState, Notice, ScheduleDraft, SubmitStatus, TimeAdjustment, UserRow,
};

use crate::action::Action;
use crate::component::Component;
use crate::theme::Palette;
use crate::widgets::usage_chart;

/// Which schedule-editor row the cursor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScheduleRow {
    Day(usize),
    Bulk,
    BulkRange,
}

/// A time field being typed into, with its in-progress text.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EditTarget {
    DayStart(Day),
    DayEnd(Day),
    BulkStart,
    BulkEnd,
}

pub struct DashboardScreen {
    model: Dashboard,
    selected: usize,
    time_adjust: Option<TimeAdjustment>,
    schedule: Option<ScheduleDraft>,
    /// Set between OpenSchedule and ScheduleLoaded/ScheduleLoadFailed.
    schedule_pending: bool,
    schedule_row: ScheduleRow,
    /// Staged bounds for the apply-to-all-days shortcut.
    bulk_start: String,
    bulk_end: String,
    editing: Option<(EditTarget, String)>,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            model: Dashboard::new(),
            selected: 0,
            time_adjust: None,
            schedule: None,
            schedule_pending: false,
            schedule_row: ScheduleRow::Day(0),
            bulk_start: String::new(),
            bulk_end: String::new(),
            editing: None,
        }
    }

    fn rows(&self) -> &[UserRow] {
        match self.model.state() {
            DashboardState::Ready { rows, .. } => rows,
            _ => &[],
        }
    }

    fn selected_row(&self) -> Option<&UserRow> {
        self.rows().get(self.selected)
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let current = self.selected.min(len - 1);
        self.selected = current.saturating_add_signed(delta).min(len - 1);
    }

    // ── Key handling ─────────────────────────────────────────────────

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char('r') => return Some(Action::RefreshDashboard),
            KeyCode::Char('t') | KeyCode::Char('+') | KeyCode::Char('-') => {
                let row = self.selected_row()?;
                return Some(Action::OpenTimeAdjust {
                    user_id: row.user.id,
                    username: row.user.username.clone(),
                });
            }
            KeyCode::Char('s') | KeyCode::Enter => {
                if self.schedule_pending {
                    return None;
                }
                let row = self.selected_row()?;
                return Some(Action::OpenSchedule {
                    user_id: row.user.id,
                    username: row.user.username.clone(),
                });
            }
            _ => {}
        }
        None
    }

    fn handle_time_adjust_key(&mut self, key: KeyEvent) -> Option<Action> {
        let flow = self.time_adjust.as_mut()?;
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                if !flow.status.locked() {
                    self.time_adjust = None;
                }
            }
            KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => flow.adjust(15),
            KeyCode::Down | KeyCode::Char('-') => flow.adjust(-15),
            KeyCode::Right => flow.adjust(30),
            KeyCode::Left => flow.adjust(-30),
            KeyCode::Char('r') => flow.reset(),
            KeyCode::Enter => {
                if flow.status.locked() {
                    return None;
                }
                match flow.request() {
                    Ok(req) => {
                        flow.status = SubmitStatus::Saving;
                        return Some(Action::SubmitTimeAdjust(req));
                    }
                    Err(_) => return Some(Action::Notify(Notice::error(ZERO_DELTA))),
                }
            }
            _ => {}
        }
        None
    }

    fn handle_schedule_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.editing.is_some() {
            return self.handle_edit_key(key);
        }
        let draft = self.schedule.as_mut()?;
        if draft.status.locked() && key.code != KeyCode::Esc {
            return None;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                if !draft.status.locked() {
                    self.schedule = None;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.schedule_row_down(),
            KeyCode::Up | KeyCode::Char('k') => self.schedule_row_up(),
            KeyCode::Left | KeyCode::Char('h') => match self.schedule_row {
                ScheduleRow::Day(i) => draft.adjust_hours(Day::ALL[i], -HOURS_STEP),
                ScheduleRow::Bulk => draft.adjust_bulk(-HOURS_STEP),
                ScheduleRow::BulkRange => {}
            },
            KeyCode::Right | KeyCode::Char('l') => match self.schedule_row {
                ScheduleRow::Day(i) => draft.adjust_hours(Day::ALL[i], HOURS_STEP),
                ScheduleRow::Bulk => draft.adjust_bulk(HOURS_STEP),
                ScheduleRow::BulkRange => {}
            },
            KeyCode::Char('w') => draft.apply_bulk(&Day::WEEKDAYS),
            KeyCode::Char('e') => draft.apply_bulk(&Day::WEEKEND),
            KeyCode::Char('a') => draft.apply_bulk(&Day::ALL),
            KeyCode::Char('t') => draft.time_ranges_enabled = !draft.time_ranges_enabled,
            KeyCode::Char('i') => self.begin_edit(false),
            KeyCode::Char('o') => self.begin_edit(true),
            KeyCode::Enter => match self.schedule_row {
                ScheduleRow::BulkRange => {
                    let notice = draft.set_time_range_all(&self.bulk_start, &self.bulk_end);
                    return Some(Action::Notify(notice));
                }
                _ => {
                    draft.status = SubmitStatus::Saving;
                    return Some(Action::SubmitSchedule(Box::new(draft.request())));
                }
            },
            _ => {}
        }
        None
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Option<Action> {
        let (target, buffer) = self.editing.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.editing = None;
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == ':' => {
                if buffer.len() < 5 {
                    buffer.push(c);
                }
            }
            KeyCode::Enter => {
                if !is_hhmm(buffer) {
                    return Some(Action::Notify(Notice::warning("Enter time as HH:MM")));
                }
                let value = buffer.clone();
                match target.clone() {
                    EditTarget::DayStart(day) => {
                        if let Some(draft) = self.schedule.as_mut() {
                            draft.set_start(day, value);
                        }
                    }
                    EditTarget::DayEnd(day) => {
                        if let Some(draft) = self.schedule.as_mut() {
                            draft.set_end(day, value);
                        }
                    }
                    EditTarget::BulkStart => self.bulk_start = value,
                    EditTarget::BulkEnd => self.bulk_end = value,
                }
                self.editing = None;
            }
            _ => {}
        }
        None
    }

    fn begin_edit(&mut self, end_field: bool) {
        let Some(draft) = self.schedule.as_ref() else {
            return;
        };
        let (target, current) = match self.schedule_row {
            ScheduleRow::Day(i) => {
                let day = Day::ALL[i];
                let row = draft.row(day);
                if end_field {
                    (EditTarget::DayEnd(day), row.end.clone())
                } else {
                    (EditTarget::DayStart(day), row.start.clone())
                }
            }
            ScheduleRow::BulkRange => {
                if end_field {
                    (EditTarget::BulkEnd, self.bulk_end.clone())
                } else {
                    (EditTarget::BulkStart, self.bulk_start.clone())
                }
            }
            ScheduleRow::Bulk => return,
        };
        self.editing = Some((target, current));
    }

    fn schedule_row_down(&mut self) {
        self.schedule_row = match self.schedule_row {
            ScheduleRow::Day(i) if i < 6 => ScheduleRow::Day(i + 1),
            ScheduleRow::Day(_) => ScheduleRow::Bulk,
            ScheduleRow::Bulk => ScheduleRow::BulkRange,
            ScheduleRow::BulkRange => ScheduleRow::BulkRange,
        };
    }

    fn schedule_row_up(&mut self) {
        self.schedule_row = match self.schedule_row {
            ScheduleRow::Day(0) => ScheduleRow::Day(0),
            ScheduleRow::Day(i) => ScheduleRow::Day(i - 1),
            ScheduleRow::Bulk => ScheduleRow::Day(6),
            ScheduleRow::BulkRange => ScheduleRow::Bulk,
        };
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_roster(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let rows = self.rows();
        let items: Vec<ListItem> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let marker = if i == self.selected { "\u{25B8} " } else { "  " };
                let badge = if row.out_of_sync() {
                    Span::styled(" \u{26A0}", palette.badge_warn())
                } else {
                    Span::styled(" \u{2713}", palette.badge_ok())
                };
                let style = if i == self.selected {
                    palette.selected()
                } else {
                    palette.body()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{marker}{}", row.user.username), style),
                    badge,
                ]))
            })
            .collect();

        let block = Block::default()
            .title(Line::styled(" Users ", palette.title()))
            .borders(Borders::ALL)
            .border_style(palette.focused_border());
        frame.render_widget(List::new(items).block(block), area);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .title(Line::styled(" Details ", palette.title()))
            .borders(Borders::ALL)
            .border_style(palette.border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(row) = self.selected_row() else {
            return;
        };

        let chunks = Layout::vertical([Constraint::Length(7), Constraint::Min(8)]).split(inner);

        let sync_badge = if row.out_of_sync() {
            Span::styled("Schedule Not Synced", palette.badge_warn())
        } else {
            Span::styled("Schedule Synced", palette.badge_ok())
        };
        let mut lines = vec![
            Line::from(vec![
                Span::styled(row.user.username.clone(), palette.title()),
                Span::styled(format!("  {}", row.user.system_ip), palette.dim()),
            ]),
            Line::from(sync_badge),
            Line::from(vec![
                Span::styled("Time left today: ", palette.dim()),
                Span::styled(
                    row.user.time_left.clone().unwrap_or_else(|| "Unknown".to_owned()),
                    palette.body(),
                ),
            ]),
            Line::from(vec![
                Span::styled("Last checked: ", palette.dim()),
                Span::styled(
                    row.user.last_checked.clone().unwrap_or_else(|| "Never".to_owned()),
                    palette.body(),
                ),
            ]),
        ];
        if let Some(pending) = &row.user.pending_adjustment {
            lines.push(Line::from(Span::styled(
                format!("Pending Time: {pending}"),
                palette.badge_warn(),
            )));
        }
        if row.user.pending_schedule {
            lines.push(Line::from(Span::styled(
                "Pending Schedule",
                palette.badge_warn(),
            )));
        }
        if let Some(synced) = &row.last_synced {
            lines.push(Line::from(vec![
                Span::styled("Last synced: ", palette.dim()),
                Span::styled(synced.clone(), palette.body()),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), chunks[0]);

        match &row.chart {
            ChartState::Ready(bars) => usage_chart::render(frame, chunks[1], palette, bars),
            ChartState::Loading => {
                frame.render_widget(
                    Paragraph::new(Span::styled(" Loading usage\u{2026}", palette.dim())),
                    chunks[1],
                );
            }
        }
    }

    fn render_time_adjust(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Some(flow) = &self.time_adjust else {
            return;
        };
        let panel = centered(area, 44, 11);
        frame.render_widget(Clear, panel);

        let block = Block::default()
            .title(Line::styled(
                format!(" Adjust Time \u{2014} {} ", flow.username()),
                palette.title(),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.focused_border())
            .style(Style::default().bg(palette.surface));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let minutes = flow.minutes();
        let delta_style = if minutes > 0 {
            Style::default().fg(palette.success)
        } else if minutes < 0 {
            Style::default().fg(palette.error)
        } else {
            palette.dim()
        };
        let sign = if minutes > 0 { "+" } else { "" };

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{sign}{minutes} minutes"),
                delta_style.add_modifier(ratatui::style::Modifier::BOLD),
            ))
            .centered(),
            Line::from(""),
            Line::from(vec![
                Span::styled("\u{2191}/\u{2193} ", palette.key_hint_key()),
                Span::styled("\u{00B1}15m  ", palette.key_hint()),
                Span::styled("\u{2190}/\u{2192} ", palette.key_hint_key()),
                Span::styled("\u{00B1}30m  ", palette.key_hint()),
                Span::styled("r ", palette.key_hint_key()),
                Span::styled("reset", palette.key_hint()),
            ])
            .centered(),
            Line::from(vec![
                Span::styled("Enter ", palette.key_hint_key()),
                Span::styled("apply  ", palette.key_hint()),
                Span::styled("Esc ", palette.key_hint_key()),
                Span::styled("cancel", palette.key_hint()),
            ])
            .centered(),
            Line::from(""),
        ];
        lines.push(status_line(&flow.status, palette).centered());
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_schedule(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Some(draft) = &self.schedule else {
            return;
        };
        let panel = centered(area, 62, 19);
        frame.render_widget(Clear, panel);

        let block = Block::default()
            .title(Line::styled(
                format!(" Edit Schedule \u{2014} {} ", draft.username()),
                palette.title(),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.focused_border())
            .style(Style::default().bg(palette.surface));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let mut lines = Vec::with_capacity(16);
        for (i, day) in Day::ALL.iter().enumerate() {
            let row = draft.row(*day);
            let selected = self.schedule_row == ScheduleRow::Day(i);
            let name_style = if day.is_weekend() {
                Style::default().fg(palette.weekend)
            } else {
                palette.body()
            };
            let window = if draft.time_ranges_enabled {
                format!(
                    "  {} \u{2013} {}",
                    self.field_text(EditTarget::DayStart(*day), &row.start),
                    self.field_text(EditTarget::DayEnd(*day), &row.end),
                )
            } else {
                String::new()
            };
            let line_style = if selected { palette.selected() } else { Style::default() };
            lines.push(
                Line::from(vec![
                    Span::styled(if selected { "\u{25B8} " } else { "  " }, line_style),
                    Span::styled(format!("{:<10}", day.name()), name_style),
                    Span::styled(format!("{:>5.2}h", row.hours), palette.body()),
                    Span::styled(window, palette.dim()),
                ])
                .style(line_style),
            );
        }

        lines.push(Line::from(""));
        let bulk_selected = self.schedule_row == ScheduleRow::Bulk;
        lines.push(
            Line::from(vec![
                Span::styled(if bulk_selected { "\u{25B8} " } else { "  " }, Style::default()),
                Span::styled("Bulk hours ", palette.body()),
                Span::styled(format!("{:>5.2}h  ", draft.bulk_hours), palette.body()),
                Span::styled("w ", palette.key_hint_key()),
                Span::styled("weekdays ", palette.key_hint()),
                Span::styled("e ", palette.key_hint_key()),
                Span::styled("weekends ", palette.key_hint()),
                Span::styled("a ", palette.key_hint_key()),
                Span::styled("all", palette.key_hint()),
            ])
            .style(if bulk_selected { palette.selected() } else { Style::default() }),
        );

        let range_selected = self.schedule_row == ScheduleRow::BulkRange;
        lines.push(
            Line::from(vec![
                Span::styled(if range_selected { "\u{25B8} " } else { "  " }, Style::default()),
                Span::styled("All days ", palette.body()),
                Span::styled(
                    format!(
                        "{} \u{2013} {}  ",
                        self.field_text(EditTarget::BulkStart, &self.bulk_start),
                        self.field_text(EditTarget::BulkEnd, &self.bulk_end),
                    ),
                    palette.body(),
                ),
                Span::styled("Enter ", palette.key_hint_key()),
                Span::styled("apply to all days", palette.key_hint()),
            ])
            .style(if range_selected { palette.selected() } else { Style::default() }),
        );

        let checkbox = if draft.time_ranges_enabled { "[x]" } else { "[ ]" };
        lines.push(Line::from(vec![
            Span::styled(format!("  {checkbox} "), palette.body()),
            Span::styled("Enable time ranges ", palette.body()),
            Span::styled("(t)", palette.key_hint()),
        ]));

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  \u{2190}/\u{2192} ", palette.key_hint_key()),
            Span::styled("\u{00B1}0.25h  ", palette.key_hint()),
            Span::styled("i/o ", palette.key_hint_key()),
            Span::styled("edit start/end  ", palette.key_hint()),
            Span::styled("Enter ", palette.key_hint_key()),
            Span::styled("save  ", palette.key_hint()),
            Span::styled("Esc ", palette.key_hint_key()),
            Span::styled("cancel", palette.key_hint()),
        ]));
        lines.push(status_line(&draft.status, palette));

        frame.render_widget(Paragraph::new(lines), inner);
    }

    /// The displayed text for a time field, showing the edit buffer
    /// with a cursor while that field is being typed into.
    fn field_text(&self, target: EditTarget, value: &str) -> String {
        match &self.editing {
            Some((editing, buffer)) if *editing == target => format!("{buffer}\u{2588}"),
            _ => {
                if value.is_empty() {
                    "--:--".to_owned()
                } else {
                    value.to_owned()
                }
            }
        }
    }
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.time_adjust.is_some() {
            return Ok(self.handle_time_adjust_key(key));
        }
        if self.schedule.is_some() {
            return Ok(self.handle_schedule_key(key));
        }
        Ok(self.handle_list_key(key))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::RefreshDashboard => {
                let generation = self.model.begin_load();
                return Ok(Some(Action::FetchDashboard(generation)));
            }
            Action::DashboardLoaded { generation, outcome } => {
                if let Some(user_ids) = self.model.apply(*generation, outcome.clone()) {
                    self.selected = self.selected.min(user_ids.len().saturating_sub(1));
                    return Ok(Some(Action::FetchCharts {
                        generation: *generation,
                        user_ids,
                    }));
                }
            }
            Action::ChartReady {
                generation,
                user_id,
                bars,
            } => {
                self.model.apply_chart(*generation, *user_id, bars.clone());
            }
            Action::OpenTimeAdjust { user_id, username } => {
                self.time_adjust = Some(TimeAdjustment::open(*user_id, username.clone()));
            }
            Action::TimeAdjustSettled(status) => {
                if let Some(flow) = self.time_adjust.as_mut() {
                    flow.status = status.clone();
                }
            }
            Action::CloseTimeAdjust => {
                self.time_adjust = None;
            }
            Action::OpenSchedule { .. } => {
                self.schedule_pending = true;
            }
            Action::ScheduleLoaded(draft) => {
                self.schedule_pending = false;
                self.schedule_row = ScheduleRow::Day(0);
                self.bulk_start.clear();
                self.bulk_end.clear();
                self.editing = None;
                self.schedule = Some((**draft).clone());
            }
            Action::ScheduleLoadFailed => {
                self.schedule_pending = false;
            }
            Action::ScheduleSettled(status) => {
                if let Some(draft) = self.schedule.as_mut() {
                    draft.status = status.clone();
                }
            }
            Action::CloseSchedule => {
                self.schedule = None;
                self.editing = None;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        match self.model.state() {
            DashboardState::Loading => {
                frame.render_widget(
                    Paragraph::new(Span::styled(" Loading\u{2026}", palette.dim())),
                    area,
                );
            }
            DashboardState::Failed => {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        " Failed to load dashboard data. Press r to retry.",
                        Style::default().fg(palette.error),
                    )),
                    area,
                );
            }
            DashboardState::Ready { ssh_warning, rows } => {
                let mut content = area;
                if let Some(warning) = ssh_warning {
                    let banner = Rect::new(area.x, area.y, area.width, 1);
                    frame.render_widget(
                        Paragraph::new(Span::styled(
                            format!(" \u{26A0} {warning}"),
                            palette.badge_warn(),
                        )),
                        banner,
                    );
                    content = Rect::new(
                        area.x,
                        area.y + 1,
                        area.width,
                        area.height.saturating_sub(1),
                    );
                }

                if rows.is_empty() {
                    frame.render_widget(
                        Paragraph::new(vec![
                            Line::from(""),
                            Line::from(Span::styled("No Users Available", palette.title()))
                                .centered(),
                            Line::from(Span::styled(
                                "Add users from the Admin panel (2)",
                                palette.dim(),
                            ))
                            .centered(),
                        ]),
                        content,
                    );
                } else {
                    let chunks = Layout::horizontal([
                        Constraint::Length(26),
                        Constraint::Min(40),
                    ])
                    .split(content);
                    self.render_roster(frame, chunks[0], palette);
                    self.render_detail(frame, chunks[1], palette);
                }
            }
        }

        self.render_time_adjust(frame, area, palette);
        self.render_schedule(frame, area, palette);
    }

    fn capturing_input(&self) -> bool {
        self.time_adjust.is_some() || self.schedule.is_some()
    }
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

fn status_line<'a>(status: &'a SubmitStatus, palette: &Palette) -> Line<'a> {
    match status {
        SubmitStatus::Idle => Line::from(""),
        SubmitStatus::Saving => Line::from(Span::styled("Saving\u{2026}", palette.dim())),
        SubmitStatus::Succeeded(message) => Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(palette.success),
        )),
        SubmitStatus::Failed(message) => Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(palette.error),
        )),
    }
}

fn is_hhmm(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2] == b':'
        && bytes[3].is_ascii_digit()
        && bytes[4].is_ascii_digit()
        && &value[0..2] < "24"
        && &value[3..5] < "60"
}
