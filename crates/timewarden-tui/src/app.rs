//! The application loop: terminal events in, actions through, frames
//! out. All mutable view state lives here or in the screens; spawned
//! work communicates back only through channels.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use timewarden_core::admin::{self, RELOAD_DELAY};
use timewarden_core::flows::{
    ADJUST_CLOSE_DELAY, SCHEDULE_CLOSE_DELAY, load_schedule, submit_adjustment, submit_schedule,
};
use timewarden_core::{
    NoticeKind, NotificationCenter, Page, Router, Session, SubmitStatus, UiEvent, dashboard,
    settings,
};
use tokio::sync::mpsc;
use tracing::warn;

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screens::{AdminScreen, DashboardScreen, LoginScreen, SettingsScreen};
use crate::theme::Palette;
use crate::tui::Tui;

const TICK_RATE: Duration = Duration::from_millis(250);
const RENDER_RATE: Duration = Duration::from_millis(33);

pub struct App {
    session: Arc<Session>,
    config: timewarden_config::Config,
    router: Router,
    notifications: NotificationCenter,
    screens: HashMap<Page, Box<dyn Component>>,
    pending_confirm: Option<ConfirmAction>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(
        session: Arc<Session>,
        config: timewarden_config::Config,
        ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut screens: HashMap<Page, Box<dyn Component>> = HashMap::new();
        screens.insert(Page::Login, Box::new(LoginScreen::new()));
        screens.insert(Page::Dashboard, Box::new(DashboardScreen::new()));
        screens.insert(Page::Admin, Box::new(AdminScreen::new()));
        screens.insert(Page::Settings, Box::new(SettingsScreen::new(config.theme)));

        Self {
            session,
            config,
            router: Router::new(),
            notifications: NotificationCenter::new(),
            screens,
            pending_confirm: None,
            action_tx,
            action_rx,
            ui_rx,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }

        let mut events = EventReader::new(TICK_RATE, RENDER_RATE);

        // Decide the landing page from the persisted token.
        let session = Arc::clone(&self.session);
        tokio::spawn(async move { session.startup().await });

        while !self.should_quit {
            tokio::select! {
                Some(event) = events.next() => self.handle_event(&mut tui, event)?,
                Some(ui_event) = self.ui_rx.recv() => self.dispatch(ui_event),
                else => break,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(action)?;
            }
        }

        events.stop();
        tui.exit()?;
        Ok(())
    }

    /// Translate a core-layer event into an action on the queue.
    fn dispatch(&mut self, event: UiEvent) {
        let action = match event {
            UiEvent::Navigate(page) => Action::ShowPage(page),
            UiEvent::Notify(notice) => Action::Notify(notice),
            UiEvent::ChartReady {
                generation,
                user_id,
                bars,
            } => Action::ChartReady {
                generation,
                user_id,
                bars,
            },
        };
        let _ = self.action_tx.send(action);
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => self.handle_key(key)?,
            Event::Render | Event::Resize(..) => {
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Tick => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Ctrl+C quits from anywhere, forms included.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            let _ = self.action_tx.send(Action::Quit);
            return Ok(());
        }

        // A pending confirmation swallows everything except its answer.
        if self.pending_confirm.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    let _ = self.action_tx.send(Action::ConfirmYes);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    let _ = self.action_tx.send(Action::ConfirmNo);
                }
                _ => {}
            }
            return Ok(());
        }

        let page = self.router.current();
        let capturing = self
            .screens
            .get(&page)
            .is_some_and(|screen| screen.capturing_input());

        if !capturing {
            match key.code {
                KeyCode::Char('q') => {
                    let _ = self.action_tx.send(Action::Quit);
                    return Ok(());
                }
                KeyCode::Char('1') if page != Page::Login => {
                    let _ = self.action_tx.send(Action::ShowPage(Page::Dashboard));
                    return Ok(());
                }
                KeyCode::Char('2') if page != Page::Login => {
                    let _ = self.action_tx.send(Action::ShowPage(Page::Admin));
                    return Ok(());
                }
                KeyCode::Char('3') if page != Page::Login => {
                    let _ = self.action_tx.send(Action::ShowPage(Page::Settings));
                    return Ok(());
                }
                KeyCode::Tab if page != Page::Login => {
                    let next = next_page(page);
                    let _ = self.action_tx.send(Action::ShowPage(next));
                    return Ok(());
                }
                _ => {}
            }
        }

        if let Some(screen) = self.screens.get_mut(&page) {
            if let Some(action) = screen.handle_key_event(key)? {
                let _ = self.action_tx.send(action);
            }
        }
        Ok(())
    }

    fn process_action(&mut self, action: Action) -> Result<()> {
        // Screens see every action; each picks out what it owns.
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(&action)? {
                let _ = self.action_tx.send(follow_up);
            }
        }

        match action {
            Action::Quit => self.should_quit = true,

            Action::ShowPage(page) => {
                let arriving = !self.router.is_active(page);
                self.router.show(page);
                // Page data reloads on every arrival, like the web
                // dashboard refetching on view switch.
                if arriving {
                    match page {
                        Page::Dashboard => {
                            let _ = self.action_tx.send(Action::RefreshDashboard);
                        }
                        Page::Admin => {
                            let _ = self.action_tx.send(Action::RefreshAdmin);
                        }
                        _ => {}
                    }
                }
            }

            Action::Notify(notice) => self.notifications.notify(notice, Instant::now()),

            Action::Logout => self.session.logout(),

            Action::LoginSubmit { username, password } => {
                let session = Arc::clone(&self.session);
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    if let Err(message) = session.login(&username, &password).await {
                        let _ = tx.send(Action::LoginFailed(message));
                    }
                });
            }

            Action::FetchDashboard(generation) => {
                let session = Arc::clone(&self.session);
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let outcome = dashboard::fetch_dashboard(&session).await;
                    let _ = tx.send(Action::DashboardLoaded { generation, outcome });
                });
            }

            Action::FetchCharts { generation, user_ids } => {
                let today = chrono::Local::now().date_naive();
                dashboard::spawn_chart_fetches(&self.session, generation, user_ids, today);
            }

            Action::SubmitTimeAdjust(req) => {
                let session = Arc::clone(&self.session);
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let status = submit_adjustment(&session, req).await;
                    let _ = tx.send(Action::TimeAdjustSettled(status));
                });
            }

            Action::TimeAdjustSettled(SubmitStatus::Succeeded(_)) => {
                // Leave the success message visible, then close and
                // refresh so the pending adjustment shows on the card.
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(ADJUST_CLOSE_DELAY).await;
                    let _ = tx.send(Action::CloseTimeAdjust);
                    let _ = tx.send(Action::RefreshDashboard);
                });
            }

            Action::OpenSchedule { user_id, username } => {
                let session = Arc::clone(&self.session);
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match load_schedule(&session, user_id, &username).await {
                        Some(draft) => {
                            let _ = tx.send(Action::ScheduleLoaded(Box::new(draft)));
                        }
                        None => {
                            let _ = tx.send(Action::ScheduleLoadFailed);
                        }
                    }
                });
            }

            Action::SubmitSchedule(req) => {
                let session = Arc::clone(&self.session);
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let status = submit_schedule(&session, &req).await;
                    let _ = tx.send(Action::ScheduleSettled(status));
                });
            }

            Action::ScheduleSettled(SubmitStatus::Succeeded(_)) => {
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(SCHEDULE_CLOSE_DELAY).await;
                    let _ = tx.send(Action::CloseSchedule);
                    let _ = tx.send(Action::RefreshDashboard);
                });
            }

            Action::RefreshAdmin => {
                let session = Arc::clone(&self.session);
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let state = admin::fetch_admin(&session).await;
                    let _ = tx.send(Action::AdminLoaded(state));
                });
            }

            Action::AddUser { username, system_ip } => {
                self.spawn_admin_mutation(move |session| async move {
                    admin::add_user(&session, &username, &system_ip).await
                });
            }

            Action::ValidateUser(user_id) => {
                self.spawn_admin_mutation(move |session| async move {
                    admin::validate_user(&session, user_id).await
                });
            }

            Action::RequestDeleteUser { user_id, username } => {
                self.pending_confirm = Some(ConfirmAction::DeleteUser { user_id, username });
            }

            Action::ConfirmYes => {
                if let Some(ConfirmAction::DeleteUser { user_id, .. }) = self.pending_confirm.take()
                {
                    self.spawn_admin_mutation(move |session| async move {
                        admin::delete_user(&session, user_id).await
                    });
                }
            }

            Action::ConfirmNo => self.pending_confirm = None,

            Action::ChangePassword { current, new, confirm } => {
                let session = Arc::clone(&self.session);
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let outcome =
                        match settings::change_password(&session, &current, &new, &confirm).await {
                            Ok(message) => Ok(message.to_owned()),
                            Err(e) => Err(e.to_string()),
                        };
                    let _ = tx.send(Action::PasswordSettled(outcome));
                });
            }

            Action::ToggleTheme => {
                self.config.theme = self.config.theme.toggled();
                if let Err(e) = timewarden_config::save_config(&self.config) {
                    warn!(error = %e, "failed to persist theme change");
                }
            }

            _ => {}
        }
        Ok(())
    }

    /// Run an admin mutation; on success, reload the table after the
    /// toast has had its moment.
    fn spawn_admin_mutation<F, Fut>(&self, mutation: F)
    where
        F: FnOnce(Arc<Session>) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = bool> + Send + 'static,
    {
        let session = Arc::clone(&self.session);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if mutation(session).await {
                tokio::time::sleep(RELOAD_DELAY).await;
                let _ = tx.send(Action::RefreshAdmin);
            }
        });
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let palette = Palette::for_theme(self.config.theme);
        let area = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(palette.bg)),
            area,
        );

        let page = self.router.current();
        if page == Page::Login {
            if let Some(screen) = self.screens.get(&page) {
                screen.render(frame, area, palette);
            }
        } else {
            let chunks = Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

            self.render_tab_bar(frame, chunks[0], palette, page);
            if let Some(screen) = self.screens.get(&page) {
                screen.render(frame, chunks[1], palette);
            }
            self.render_status_bar(frame, chunks[2], palette);
        }

        self.render_toast(frame, area, palette);
        self.render_confirm(frame, area, palette);
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect, palette: &Palette, page: Page) {
        let mut spans = vec![Span::styled(" Timewarden ", palette.title())];
        for (i, tab) in Page::AUTHENTICATED.iter().enumerate() {
            let style = if *tab == page {
                palette.tab_active()
            } else {
                palette.tab_inactive()
            };
            spans.push(Span::styled(format!("  {} {}", i + 1, tab.label()), style));
        }

        let mut line = Line::from(spans);
        if let Some(identity) = self.session.identity() {
            let label = format!("{identity} ");
            let used: usize = line.spans.iter().map(|s| s.content.chars().count()).sum();
            let pad = usize::from(area.width).saturating_sub(used + label.chars().count());
            line.spans.push(Span::raw(" ".repeat(pad)));
            line.spans.push(Span::styled(label, palette.dim()));
        }
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let hints: &[(&str, &str)] = match self.router.current() {
            Page::Dashboard => &[
                ("j/k", "select"),
                ("t", "adjust time"),
                ("s", "schedule"),
                ("r", "refresh"),
                ("q", "quit"),
            ],
            Page::Admin => &[
                ("j/k", "select"),
                ("a", "add"),
                ("v", "validate"),
                ("d", "delete"),
                ("r", "refresh"),
                ("q", "quit"),
            ],
            Page::Settings => &[("Tab", "next field"), ("Enter", "select"), ("Ctrl+C", "quit")],
            Page::Login => &[],
        };

        let mut spans = vec![Span::raw(" ")];
        for (key, label) in hints {
            spans.push(Span::styled(format!("{key} "), palette.key_hint_key()));
            spans.push(Span::styled(format!("{label}  "), palette.key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_toast(&mut self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Some(notice) = self.notifications.current(Instant::now()) else {
            return;
        };

        let color = match notice.kind {
            NoticeKind::Success => palette.success,
            NoticeKind::Error => palette.error,
            NoticeKind::Warning => palette.warning,
            NoticeKind::Info => palette.info,
        };

        let width = (notice.message.chars().count() as u16 + 4)
            .min(area.width.saturating_sub(2))
            .max(10);
        let toast = Rect::new(
            area.x + area.width.saturating_sub(width + 1),
            area.y + area.height.saturating_sub(4),
            width,
            3,
        );

        frame.render_widget(Clear, toast);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(palette.surface));
        let inner = block.inner(toast);
        frame.render_widget(block, toast);
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {}", notice.message),
                Style::default().fg(color),
            )),
            inner,
        );
    }

    fn render_confirm(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Some(confirm) = &self.pending_confirm else {
            return;
        };

        let message = confirm.to_string();
        let width = (message.chars().count() as u16 + 6).min(area.width.saturating_sub(2));
        let panel = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(5)) / 2,
            width,
            5,
        );

        frame.render_widget(Clear, panel);
        let block = Block::default()
            .title(Line::styled(" Confirm ", palette.title()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette.warning))
            .style(Style::default().bg(palette.surface));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        frame.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(message, palette.body())).centered(),
                Line::from(vec![
                    Span::styled("y ", palette.key_hint_key()),
                    Span::styled("delete  ", palette.key_hint()),
                    Span::styled("n ", palette.key_hint_key()),
                    Span::styled("cancel", palette.key_hint()),
                ])
                .centered(),
            ]),
            inner,
        );
    }
}

fn next_page(page: Page) -> Page {
    match page {
        Page::Dashboard => Page::Admin,
        Page::Admin => Page::Settings,
        Page::Settings | Page::Login => Page::Dashboard,
    }
}
