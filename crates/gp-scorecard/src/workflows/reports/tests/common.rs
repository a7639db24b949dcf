use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::config::ReportScheduleConfig;
use crate::workflows::bonus::MonthlyFacts;
use crate::workflows::reports::{
    ActiveUser, ManagedTeam, MonthlyReportRunner, MonthlyStatsSource, NotificationError,
    OwnerMessage, PresenterMonthlyStats, ReportCollaborators, ReportDraft, ReportId,
    ReportNotifier, ReportPeriod, ReportStore, RepositoryError, StoredReport, TeamDirectory,
    TeamId, UserId,
};

pub(super) fn period() -> ReportPeriod {
    ReportPeriod::new(1, 2024).expect("valid period")
}

pub(super) fn user(id: &str, name: &str) -> ActiveUser {
    ActiveUser {
        id: UserId(id.to_string()),
        name: name.to_string(),
        email: Some(format!("{id}@example.com")),
    }
}

pub(super) fn team(id: &str) -> ManagedTeam {
    ManagedTeam {
        id: TeamId(id.to_string()),
        name: format!("Team {id}"),
        floor_manager: "Marek Tamm".to_string(),
    }
}

pub(super) fn presenter(name: &str, total: f64, games: u64, errors: u64) -> PresenterMonthlyStats {
    PresenterMonthlyStats {
        gp_name: name.to_string(),
        evaluation_count: 3,
        avg_total_score: total,
        avg_appearance_score: total / 2.0,
        avg_game_performance_score: total / 2.4,
        facts: MonthlyFacts {
            gp_id: name.to_lowercase().replace(' ', "-"),
            month: 1,
            year: 2024,
            total_games_played: games,
            error_count: errors,
            hours_worked: 120.0,
            has_disqualifying_factors: false,
            sickleave_late_violations: false,
        },
    }
}

pub(super) fn schedule_config(team_timeout: Duration) -> ReportScheduleConfig {
    ReportScheduleConfig {
        team_timeout,
        ..ReportScheduleConfig::default()
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    users: Vec<ActiveUser>,
    teams: HashMap<UserId, Vec<ManagedTeam>>,
    unreadable_users: HashSet<UserId>,
    fail_enumeration: bool,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
    enumeration_calls: AtomicUsize,
}

impl MemoryDirectory {
    pub(super) fn with_user(mut self, user: ActiveUser, teams: Vec<ManagedTeam>) -> Self {
        self.teams.insert(user.id.clone(), teams);
        self.users.push(user);
        self
    }

    pub(super) fn with_unreadable_user(mut self, user: ActiveUser) -> Self {
        self.unreadable_users.insert(user.id.clone());
        self.users.push(user);
        self
    }

    pub(super) fn failing() -> Self {
        Self {
            fail_enumeration: true,
            ..Self::default()
        }
    }

    /// Signals `entered` once enumeration starts, then waits for `release`.
    pub(super) fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((entered, release));
        self
    }

    pub(super) fn enumeration_calls(&self) -> usize {
        self.enumeration_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TeamDirectory for MemoryDirectory {
    async fn active_users(&self) -> Result<Vec<ActiveUser>, RepositoryError> {
        self.enumeration_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        if self.fail_enumeration {
            return Err(RepositoryError::Unavailable("user table locked".to_string()));
        }
        Ok(self.users.clone())
    }

    async fn teams_for_user(&self, user: &UserId) -> Result<Vec<ManagedTeam>, RepositoryError> {
        if self.unreadable_users.contains(user) {
            return Err(RepositoryError::Unavailable("team lookup failed".to_string()));
        }
        Ok(self.teams.get(user).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub(super) struct MemoryStats {
    by_team: HashMap<TeamId, Vec<PresenterMonthlyStats>>,
    failing: HashSet<TeamId>,
    stalled: HashSet<TeamId>,
}

impl MemoryStats {
    pub(super) fn with_team(mut self, team: &str, stats: Vec<PresenterMonthlyStats>) -> Self {
        self.by_team.insert(TeamId(team.to_string()), stats);
        self
    }

    pub(super) fn failing_for(mut self, team: &str) -> Self {
        self.failing.insert(TeamId(team.to_string()));
        self
    }

    pub(super) fn stalled_for(mut self, team: &str) -> Self {
        self.stalled.insert(TeamId(team.to_string()));
        self
    }
}

#[async_trait]
impl MonthlyStatsSource for MemoryStats {
    async fn presenter_stats(
        &self,
        team: &TeamId,
        _period: ReportPeriod,
    ) -> Result<Vec<PresenterMonthlyStats>, RepositoryError> {
        if self.stalled.contains(team) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(team) {
            return Err(RepositoryError::Unavailable("aggregation query failed".to_string()));
        }
        Ok(self.by_team.get(team).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    reports: Mutex<Vec<StoredReport>>,
    sequence: AtomicUsize,
}

impl MemoryStore {
    pub(super) fn reports(&self) -> Vec<StoredReport> {
        self.reports.lock().expect("store mutex poisoned").clone()
    }

    pub(super) fn reports_for(&self, team: &str) -> usize {
        self.reports()
            .iter()
            .filter(|report| report.team_id.0 == team)
            .count()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn report_exists(
        &self,
        team: &TeamId,
        period: ReportPeriod,
    ) -> Result<bool, RepositoryError> {
        let reports = self.reports.lock().expect("store mutex poisoned");
        Ok(reports
            .iter()
            .any(|report| &report.team_id == team && report.period == period))
    }

    async fn create_report(&self, draft: ReportDraft) -> Result<StoredReport, RepositoryError> {
        let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let report = StoredReport {
            id: ReportId(format!("rpt-{id:04}")),
            team_id: draft.team_id,
            period: draft.period,
            generated_by: draft.generated_by,
            content: draft.content,
        };
        self.reports
            .lock()
            .expect("store mutex poisoned")
            .push(report.clone());
        Ok(report)
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    fail: bool,
    ready: Mutex<Vec<(UserId, ReportId)>>,
    owner: Mutex<Vec<OwnerMessage>>,
}

impl MemoryNotifier {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn ready(&self) -> Vec<(UserId, ReportId)> {
        self.ready.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn owner_messages(&self) -> Vec<OwnerMessage> {
        self.owner.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl ReportNotifier for MemoryNotifier {
    async fn report_ready(
        &self,
        recipient: &ActiveUser,
        report: &StoredReport,
    ) -> Result<(), NotificationError> {
        self.ready
            .lock()
            .expect("notifier mutex poisoned")
            .push((recipient.id.clone(), report.id.clone()));
        if self.fail {
            return Err(NotificationError::Transport("smtp down".to_string()));
        }
        Ok(())
    }

    async fn notify_owner(&self, message: OwnerMessage) -> Result<(), NotificationError> {
        self.owner
            .lock()
            .expect("notifier mutex poisoned")
            .push(message);
        if self.fail {
            return Err(NotificationError::Transport("smtp down".to_string()));
        }
        Ok(())
    }
}

pub(super) struct Harness {
    pub(super) directory: Arc<MemoryDirectory>,
    pub(super) store: Arc<MemoryStore>,
    pub(super) notifier: Arc<MemoryNotifier>,
    pub(super) runner: Arc<MonthlyReportRunner>,
}

pub(super) fn harness(
    directory: MemoryDirectory,
    stats: MemoryStats,
    notifier: MemoryNotifier,
    team_timeout: Duration,
) -> Harness {
    let directory = Arc::new(directory);
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(notifier);
    let collaborators = ReportCollaborators {
        directory: directory.clone(),
        stats: Arc::new(stats),
        store: store.clone(),
        notifier: notifier.clone(),
    };
    let runner = Arc::new(MonthlyReportRunner::new(
        collaborators,
        &schedule_config(team_timeout),
    ));

    Harness {
        directory,
        store,
        notifier,
        runner,
    }
}
