//! Dashboard view model: roster, per-user sync badges, and the
//! background usage-chart fetches.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use timewarden_api::UserSummary;
use tracing::debug;

use crate::chart::{DayBar, synthetic_week, week_bars};
use crate::event::{Notice, UiEvent};
use crate::session::Session;

pub const LOAD_FAILED: &str = "Failed to load dashboard data";

/// Chart area of one user card.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartState {
    Loading,
    Ready(Vec<DayBar>),
}

/// One user card: the roster entry joined with its sync status.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub user: UserSummary,
    pub synced: bool,
    pub last_synced: Option<String>,
    pub last_modified: Option<String>,
    pub chart: ChartState,
}

impl UserRow {
    /// Whether the card shows the "Schedule Not Synced" badge.
    pub fn out_of_sync(&self) -> bool {
        self.user.pending_schedule || !self.synced
    }
}

#[derive(Debug, Clone)]
pub enum DashboardState {
    Loading,
    Failed,
    Ready {
        /// Banner text when the backend's SSH key is missing.
        ssh_warning: Option<String>,
        rows: Vec<UserRow>,
    },
}

/// Result of one roster fetch, applied back on the UI loop.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded {
        ssh_warning: Option<String>,
        rows: Vec<UserRow>,
    },
    Failed,
}

/// Dashboard state plus the load generation counter.
///
/// Each reload bumps the generation, and every result -- the roster
/// itself and each chart fetched for it -- carries the generation that
/// requested it. Results from an abandoned load compare stale and are
/// dropped, so a slow old fetch can never overwrite a newer one.
#[derive(Debug)]
pub struct Dashboard {
    state: DashboardState,
    generation: u64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            state: DashboardState::Loading,
            generation: 0,
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Start a reload: invalidate all in-flight results and return the
    /// new generation for the fetch about to be spawned.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.state = DashboardState::Loading;
        self.generation
    }

    /// Apply a finished roster fetch. Returns the user ids whose charts
    /// should now be fetched, or `None` if the result was stale or the
    /// load failed.
    pub fn apply(&mut self, generation: u64, outcome: LoadOutcome) -> Option<Vec<i64>> {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale dashboard load");
            return None;
        }
        match outcome {
            LoadOutcome::Loaded { ssh_warning, rows } => {
                let ids = rows.iter().map(|r| r.user.id).collect();
                self.state = DashboardState::Ready { ssh_warning, rows };
                Some(ids)
            }
            LoadOutcome::Failed => {
                self.state = DashboardState::Failed;
                None
            }
        }
    }

    /// Apply a finished chart fetch, unless it belongs to an abandoned
    /// load or a user no longer on the roster.
    pub fn apply_chart(&mut self, generation: u64, user_id: i64, bars: Vec<DayBar>) {
        if generation != self.generation {
            debug!(generation, user_id, "dropping stale chart result");
            return;
        }
        if let DashboardState::Ready { rows, .. } = &mut self.state {
            if let Some(row) = rows.iter_mut().find(|r| r.user.id == user_id) {
                row.chart = ChartState::Ready(bars);
            }
        }
    }
}

/// Fetch everything a dashboard render needs: SSH status, the roster,
/// and one sync status per user (concurrently).
///
/// Sync-status failures are absorbed per user: a card whose status
/// could not be fetched shows as synced rather than raising a false
/// alarm for the whole roster. Chart fetches are NOT started here --
/// the caller applies the outcome first, then spawns them, so charts
/// can only ever land on the roster they were requested for.
pub async fn fetch_dashboard(session: &Session) -> LoadOutcome {
    let ssh_warning = match session.settle(session.api().ssh_status().await) {
        Ok(status) if !status.ssh_key_exists => Some(status.message),
        _ => None,
    };
    if let Some(message) = &ssh_warning {
        session.notify(Notice::warning(message.clone()));
    }

    let users = match session.settle(session.api().dashboard().await) {
        Ok(users) => users,
        Err(_) => return LoadOutcome::Failed,
    };

    let statuses = join_all(users.iter().map(|user| async {
        session
            .settle(session.api().schedule_sync_status(user.id).await)
            .ok()
    }))
    .await;

    let rows = users
        .into_iter()
        .zip(statuses)
        .map(|(user, status)| match status {
            Some(s) => UserRow {
                user,
                synced: s.is_synced,
                last_synced: s.last_synced,
                last_modified: s.last_modified,
                chart: ChartState::Loading,
            },
            None => UserRow {
                user,
                synced: true,
                last_synced: None,
                last_modified: None,
                chart: ChartState::Loading,
            },
        })
        .collect();

    LoadOutcome::Loaded { ssh_warning, rows }
}

/// Spawn one background usage fetch per user. Failures and empty
/// series both fall back to a zeroed week so the card keeps its chart.
pub fn spawn_chart_fetches(
    session: &Arc<Session>,
    generation: u64,
    user_ids: Vec<i64>,
    today: NaiveDate,
) {
    for user_id in user_ids {
        let session = Arc::clone(session);
        tokio::spawn(async move {
            let bars = match session.settle(session.api().usage(user_id).await) {
                Ok(series) if !series.data.is_empty() => week_bars(&series.data, today),
                _ => synthetic_week(today),
            };
            session.send(UiEvent::ChartReady {
                generation,
                user_id,
                bars,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn row(id: i64) -> UserRow {
        UserRow {
            user: UserSummary {
                id,
                username: format!("user{id}"),
                system_ip: "192.168.1.10".to_owned(),
                time_left: None,
                last_checked: None,
                pending_adjustment: None,
                pending_schedule: false,
                is_valid: true,
            },
            synced: true,
            last_synced: None,
            last_modified: None,
            chart: ChartState::Loading,
        }
    }

    fn loaded(ids: &[i64]) -> LoadOutcome {
        LoadOutcome::Loaded {
            ssh_warning: None,
            rows: ids.iter().map(|&id| row(id)).collect(),
        }
    }

    #[test]
    fn stale_roster_result_is_dropped() {
        let mut dash = Dashboard::new();
        let old = dash.begin_load();
        let new = dash.begin_load();

        assert_eq!(dash.apply(old, loaded(&[1])), None);
        assert!(matches!(dash.state(), DashboardState::Loading));

        assert_eq!(dash.apply(new, loaded(&[1, 2])), Some(vec![1, 2]));
        assert!(matches!(dash.state(), DashboardState::Ready { .. }));
    }

    #[test]
    fn stale_chart_result_is_dropped() {
        let mut dash = Dashboard::new();
        let old = dash.begin_load();
        dash.apply(old, loaded(&[7]));

        let new = dash.begin_load();
        dash.apply(new, loaded(&[7]));

        let bars = vec![DayBar {
            label: "Today".to_owned(),
            hours: 1.0,
            weekend: false,
        }];
        dash.apply_chart(old, 7, bars.clone());

        let DashboardState::Ready { rows, .. } = dash.state() else {
            panic!("dashboard should be ready");
        };
        assert_eq!(rows[0].chart, ChartState::Loading);

        dash.apply_chart(new, 7, bars.clone());
        let DashboardState::Ready { rows, .. } = dash.state() else {
            panic!("dashboard should be ready");
        };
        assert_eq!(rows[0].chart, ChartState::Ready(bars));
    }

    #[test]
    fn chart_for_unknown_user_is_ignored() {
        let mut dash = Dashboard::new();
        let generation = dash.begin_load();
        dash.apply(generation, loaded(&[1]));

        dash.apply_chart(generation, 99, vec![]);
        let DashboardState::Ready { rows, .. } = dash.state() else {
            panic!("dashboard should be ready");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].chart, ChartState::Loading);
    }

    #[test]
    fn failed_load_sets_failed_state() {
        let mut dash = Dashboard::new();
        let generation = dash.begin_load();
        assert_eq!(dash.apply(generation, LoadOutcome::Failed), None);
        assert!(matches!(dash.state(), DashboardState::Failed));
    }

    #[test]
    fn pending_schedule_forces_out_of_sync_badge() {
        let mut r = row(1);
        assert!(!r.out_of_sync());
        r.user.pending_schedule = true;
        assert!(r.out_of_sync());
        r.user.pending_schedule = false;
        r.synced = false;
        assert!(r.out_of_sync());
    }
}
