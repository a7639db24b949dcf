use async_trait::async_trait;

use super::domain::{
    ActiveUser, ManagedTeam, PresenterMonthlyStats, ReportDraft, ReportPeriod, StoredReport,
    TeamId, UserId,
};
use super::summary::OwnerMessage;

/// Who owns which teams.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn active_users(&self) -> Result<Vec<ActiveUser>, RepositoryError>;
    async fn teams_for_user(&self, user: &UserId) -> Result<Vec<ManagedTeam>, RepositoryError>;
}

/// Per-presenter monthly aggregation over evaluations, errors, and attendance.
#[async_trait]
pub trait MonthlyStatsSource: Send + Sync {
    async fn presenter_stats(
        &self,
        team: &TeamId,
        period: ReportPeriod,
    ) -> Result<Vec<PresenterMonthlyStats>, RepositoryError>;
}

/// Report persistence; existence of a report is the idempotency key for a run.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn report_exists(&self, team: &TeamId, period: ReportPeriod)
        -> Result<bool, RepositoryError>;
    async fn create_report(&self, draft: ReportDraft) -> Result<StoredReport, RepositoryError>;
}

/// Outbound e-mail and owner notifications. Failures never undo a report.
#[async_trait]
pub trait ReportNotifier: Send + Sync {
    async fn report_ready(
        &self,
        recipient: &ActiveUser,
        report: &StoredReport,
    ) -> Result<(), NotificationError>;
    async fn notify_owner(&self, message: OwnerMessage) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("recipient has no deliverable address")]
    NoRecipient,
}
