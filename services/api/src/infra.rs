use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use gp_scorecard::workflows::bonus::MonthlyFacts;
use gp_scorecard::workflows::reports::{
    ActiveUser, ManagedTeam, MonthlyStatsSource, NotificationError, OwnerMessage,
    PresenterMonthlyStats, ReportCollaborators, ReportDraft, ReportId, ReportNotifier,
    ReportPeriod, ReportStore, RepositoryError, StoredReport, TeamDirectory, TeamId, UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Users and the teams they manage, fixed at startup.
#[derive(Default, Clone)]
pub(crate) struct InMemoryTeamDirectory {
    users: Vec<ActiveUser>,
    teams: HashMap<UserId, Vec<ManagedTeam>>,
}

impl InMemoryTeamDirectory {
    pub(crate) fn with_user(mut self, user: ActiveUser, teams: Vec<ManagedTeam>) -> Self {
        self.teams.insert(user.id.clone(), teams);
        self.users.push(user);
        self
    }
}

#[async_trait]
impl TeamDirectory for InMemoryTeamDirectory {
    async fn active_users(&self) -> Result<Vec<ActiveUser>, RepositoryError> {
        Ok(self.users.clone())
    }

    async fn teams_for_user(&self, user: &UserId) -> Result<Vec<ManagedTeam>, RepositoryError> {
        Ok(self.teams.get(user).cloned().unwrap_or_default())
    }
}

/// Per-team presenter aggregates; every period sees the same figures.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStatsSource {
    by_team: HashMap<TeamId, Vec<PresenterMonthlyStats>>,
}

impl InMemoryStatsSource {
    pub(crate) fn with_team(mut self, team: &TeamId, stats: Vec<PresenterMonthlyStats>) -> Self {
        self.by_team.insert(team.clone(), stats);
        self
    }
}

#[async_trait]
impl MonthlyStatsSource for InMemoryStatsSource {
    async fn presenter_stats(
        &self,
        team: &TeamId,
        period: ReportPeriod,
    ) -> Result<Vec<PresenterMonthlyStats>, RepositoryError> {
        let stats = self.by_team.get(team).cloned().unwrap_or_default();
        Ok(stats
            .into_iter()
            .map(|mut presenter| {
                presenter.facts.month = period.month();
                presenter.facts.year = period.year();
                presenter
            })
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReportStore {
    reports: Arc<Mutex<Vec<StoredReport>>>,
}

impl InMemoryReportStore {
    pub(crate) fn reports(&self) -> Vec<StoredReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn report_exists(
        &self,
        team: &TeamId,
        period: ReportPeriod,
    ) -> Result<bool, RepositoryError> {
        let guard = self.reports.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard
            .iter()
            .any(|report| &report.team_id == team && report.period == period))
    }

    async fn create_report(&self, draft: ReportDraft) -> Result<StoredReport, RepositoryError> {
        let mut guard = self.reports.lock().unwrap_or_else(PoisonError::into_inner);
        if guard
            .iter()
            .any(|report| report.team_id == draft.team_id && report.period == draft.period)
        {
            return Err(RepositoryError::Conflict);
        }
        let report = StoredReport {
            id: ReportId((guard.len() + 1).to_string()),
            team_id: draft.team_id,
            period: draft.period,
            generated_by: draft.generated_by,
            content: draft.content,
        };
        guard.push(report.clone());
        Ok(report)
    }
}

/// Writes notifications to the log instead of a mail transport.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotifier;

#[async_trait]
impl ReportNotifier for LoggingNotifier {
    async fn report_ready(
        &self,
        recipient: &ActiveUser,
        report: &StoredReport,
    ) -> Result<(), NotificationError> {
        let Some(email) = recipient.email.as_deref() else {
            warn!(user = %recipient.name, report = %report.id, "no address for report notification");
            return Err(NotificationError::NoRecipient);
        };
        info!(%email, report = %report.id, period = %report.period, "report ready notification");
        Ok(())
    }

    async fn notify_owner(&self, message: OwnerMessage) -> Result<(), NotificationError> {
        info!(title = %message.title, "owner notification\n{}", message.content);
        Ok(())
    }
}

/// Collaborators backed by the seeded in-memory fixtures, plus the store for inspection.
pub(crate) fn seeded_collaborators() -> (ReportCollaborators, Arc<InMemoryReportStore>) {
    let aurora = ManagedTeam {
        id: TeamId("aurora".to_string()),
        name: "Team Aurora".to_string(),
        floor_manager: "Marek Tamm".to_string(),
    };
    let borealis = ManagedTeam {
        id: TeamId("borealis".to_string()),
        name: "Team Borealis".to_string(),
        floor_manager: "Liis Saar".to_string(),
    };
    let quiet = ManagedTeam {
        id: TeamId("nightshift".to_string()),
        name: "Team Nightshift".to_string(),
        floor_manager: "Liis Saar".to_string(),
    };

    let stats = InMemoryStatsSource::default()
        .with_team(
            &aurora.id,
            vec![
                presenter("Sofia Barchan", 21.2, 5400, 1, 152.0),
                presenter("Anna-Maria Kuusk", 19.1, 2900, 1, 138.5),
                presenter("Peeter Kask", 16.4, 1800, 4, 120.0),
            ],
        )
        .with_team(
            &borealis.id,
            vec![
                presenter("Jaan Tamm", 18.6, 3100, 2, 140.0),
                presenter("Kertu Mets", 20.3, 4700, 0, 149.0),
            ],
        );

    let directory = InMemoryTeamDirectory::default()
        .with_user(
            ActiveUser {
                id: UserId("fm-1".to_string()),
                name: "Marek Tamm".to_string(),
                email: Some("marek.tamm@example.com".to_string()),
            },
            vec![aurora],
        )
        .with_user(
            ActiveUser {
                id: UserId("fm-2".to_string()),
                name: "Liis Saar".to_string(),
                email: None,
            },
            vec![borealis, quiet],
        );

    let store = Arc::new(InMemoryReportStore::default());
    let collaborators = ReportCollaborators {
        directory: Arc::new(directory),
        stats: Arc::new(stats),
        store: store.clone(),
        notifier: Arc::new(LoggingNotifier),
    };
    (collaborators, store)
}

fn presenter(name: &str, total: f64, games: u64, errors: u64, hours: f64) -> PresenterMonthlyStats {
    PresenterMonthlyStats {
        gp_name: name.to_string(),
        evaluation_count: 4,
        avg_total_score: total,
        avg_appearance_score: total * 0.5,
        avg_game_performance_score: total * 0.42,
        facts: MonthlyFacts {
            gp_id: name.to_lowercase().replace(' ', "-"),
            month: 1,
            year: 2024,
            total_games_played: games,
            error_count: errors,
            hours_worked: hours,
            has_disqualifying_factors: false,
            sickleave_late_violations: false,
        },
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
