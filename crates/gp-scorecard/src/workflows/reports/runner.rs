use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::domain::{ActiveUser, ManagedTeam, ReportDraft, ReportId, ReportPeriod, TeamId};
use super::repository::{
    MonthlyStatsSource, ReportNotifier, ReportStore, RepositoryError, TeamDirectory,
};
use super::summary::{compose, run_failure_message, run_summary_message, OwnerMessage};
use crate::config::ReportScheduleConfig;
use crate::workflows::bonus::BonusCalculator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Running,
}

impl RunStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
        }
    }
}

/// What happened to one team during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TeamOutcome {
    Generated { report_id: ReportId },
    SkippedExisting,
    SkippedNoData,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamRunRecord {
    pub owner: String,
    pub team_id: TeamId,
    pub team_name: String,
    #[serde(flatten)]
    pub outcome: TeamOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub period: ReportPeriod,
    pub teams: Vec<TeamRunRecord>,
}

impl RunSummary {
    pub fn generated_count(&self) -> usize {
        self.teams
            .iter()
            .filter(|record| matches!(record.outcome, TeamOutcome::Generated { .. }))
            .count()
    }

    /// Every team that did not produce a report, failures included.
    pub fn skipped_count(&self) -> usize {
        self.teams.len() - self.generated_count()
    }

    pub fn failed_count(&self) -> usize {
        self.teams
            .iter()
            .filter(|record| matches!(record.outcome, TeamOutcome::Failed { .. }))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    AlreadyRunning,
    Completed(RunSummary),
    Aborted { period: ReportPeriod, reason: String },
}

/// Collaborators a run talks to.
#[derive(Clone)]
pub struct ReportCollaborators {
    pub directory: Arc<dyn TeamDirectory>,
    pub stats: Arc<dyn MonthlyStatsSource>,
    pub store: Arc<dyn ReportStore>,
    pub notifier: Arc<dyn ReportNotifier>,
}

/// Generates at most one report per team and period, one run at a time.
///
/// A trigger that arrives while a run is in flight returns
/// [`RunOutcome::AlreadyRunning`] without touching any collaborator. Teams are
/// processed sequentially; each team's collaborator calls share one deadline and a
/// failure or timeout there is recorded for that team only.
pub struct MonthlyReportRunner {
    collaborators: ReportCollaborators,
    calculator: BonusCalculator,
    timezone: Tz,
    team_timeout: Duration,
    running: AtomicBool,
}

impl MonthlyReportRunner {
    pub fn new(collaborators: ReportCollaborators, config: &ReportScheduleConfig) -> Self {
        Self {
            collaborators,
            calculator: BonusCalculator::default(),
            timezone: config.timezone,
            team_timeout: config.team_timeout,
            running: AtomicBool::new(false),
        }
    }

    pub fn with_calculator(mut self, calculator: BonusCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn status(&self) -> RunStatus {
        if self.running.load(Ordering::Acquire) {
            RunStatus::Running
        } else {
            RunStatus::Idle
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Period a run started at `now` reports on: the previous month in the facility timezone.
    pub fn period_at(&self, now: DateTime<Utc>) -> ReportPeriod {
        ReportPeriod::previous_month_of(now.with_timezone(&self.timezone).date_naive())
    }

    pub async fn run_previous_month(&self) -> RunOutcome {
        self.run_for(self.period_at(Utc::now())).await
    }

    pub async fn run_for(&self, period: ReportPeriod) -> RunOutcome {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            info!(%period, "monthly report generation already running, skipping trigger");
            return RunOutcome::AlreadyRunning;
        };

        info!(%period, "starting monthly report generation");

        let users = match self.collaborators.directory.active_users().await {
            Ok(users) => users,
            Err(err) => {
                error!(%period, error = %err, "monthly report generation aborted");
                let reason = err.to_string();
                self.notify_owner(run_failure_message(period, &reason)).await;
                return RunOutcome::Aborted { period, reason };
            }
        };

        let mut summary = RunSummary {
            period,
            teams: Vec::new(),
        };

        for user in &users {
            let teams = match self.collaborators.directory.teams_for_user(&user.id).await {
                Ok(teams) => teams,
                Err(err) => {
                    warn!(user = %user.name, error = %err, "could not list teams for user");
                    continue;
                }
            };

            for team in teams {
                let outcome = self.process_team_with_deadline(user, &team, period).await;
                summary.teams.push(TeamRunRecord {
                    owner: user.name.clone(),
                    team_id: team.id,
                    team_name: team.name,
                    outcome,
                });
            }
        }

        info!(
            %period,
            generated = summary.generated_count(),
            skipped = summary.skipped_count(),
            failed = summary.failed_count(),
            "monthly report generation completed"
        );

        self.notify_owner(run_summary_message(&summary)).await;
        RunOutcome::Completed(summary)
    }

    async fn process_team_with_deadline(
        &self,
        user: &ActiveUser,
        team: &ManagedTeam,
        period: ReportPeriod,
    ) -> TeamOutcome {
        let report = match tokio::time::timeout(self.team_timeout, self.process_team(user, team, period))
            .await
        {
            Ok(Ok(TeamStep::Done(outcome))) => return outcome,
            Ok(Ok(TeamStep::Created(report))) => report,
            Ok(Err(err)) => {
                error!(team_id = %team.id, %period, error = %err, "report generation failed for team");
                return TeamOutcome::Failed {
                    reason: err.to_string(),
                };
            }
            Err(_) => {
                error!(
                    team_id = %team.id,
                    %period,
                    timeout_secs = self.team_timeout.as_secs(),
                    "report generation timed out for team"
                );
                return TeamOutcome::Failed {
                    reason: format!("timed out after {}s", self.team_timeout.as_secs()),
                };
            }
        };

        match tokio::time::timeout(
            self.team_timeout,
            self.collaborators.notifier.report_ready(user, &report),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(team_id = %team.id, report_id = %report.id, error = %err, "report e-mail failed");
            }
            Err(_) => {
                warn!(team_id = %team.id, report_id = %report.id, "report e-mail timed out");
            }
        }

        info!(team_id = %team.id, report_id = %report.id, %period, "generated monthly report");
        TeamOutcome::Generated {
            report_id: report.id,
        }
    }

    async fn process_team(
        &self,
        user: &ActiveUser,
        team: &ManagedTeam,
        period: ReportPeriod,
    ) -> Result<TeamStep, RepositoryError> {
        if self.collaborators.store.report_exists(&team.id, period).await? {
            debug!(team_id = %team.id, %period, "report already exists, skipping");
            return Ok(TeamStep::Done(TeamOutcome::SkippedExisting));
        }

        let stats = self
            .collaborators
            .stats
            .presenter_stats(&team.id, period)
            .await?;
        if stats.is_empty() {
            debug!(team_id = %team.id, %period, "no evaluation data, skipping");
            return Ok(TeamStep::Done(TeamOutcome::SkippedNoData));
        }

        let content = compose(team, period, &stats, &self.calculator);
        let draft = ReportDraft {
            team_id: team.id.clone(),
            period,
            generated_by: user.id.clone(),
            content,
            stats,
        };

        let report = self.collaborators.store.create_report(draft).await?;
        Ok(TeamStep::Created(report))
    }

    async fn notify_owner(&self, message: OwnerMessage) {
        let title = message.title.clone();
        match tokio::time::timeout(
            self.team_timeout,
            self.collaborators.notifier.notify_owner(message),
        )
        .await
        {
            Ok(Ok(())) => debug!(%title, "owner notified"),
            Ok(Err(err)) => warn!(%title, error = %err, "owner notification failed"),
            Err(_) => warn!(%title, "owner notification timed out"),
        }
    }
}

enum TeamStep {
    Done(TeamOutcome),
    Created(super::domain::StoredReport),
}

/// Clears the running flag when the run ends, however it ends.
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
