//! Monthly team reports: a guarded, idempotent run over every active user's teams, with
//! cron wiring and a manual HTTP trigger.

pub mod domain;
pub mod repository;
pub mod router;
pub mod runner;
pub mod schedule;
pub mod summary;

#[cfg(test)]
mod tests;

pub use domain::{
    ActiveUser, ManagedTeam, PresenterMonthlyStats, ReportDraft, ReportId, ReportPeriod,
    StoredReport, TeamId, UserId, MONTH_NAMES,
};
pub use repository::{
    MonthlyStatsSource, NotificationError, ReportNotifier, ReportStore, RepositoryError,
    TeamDirectory,
};
pub use router::monthly_report_router;
pub use runner::{
    MonthlyReportRunner, ReportCollaborators, RunOutcome, RunStatus, RunSummary, TeamOutcome,
    TeamRunRecord,
};
pub use schedule::{MonthlyReportSchedule, ScheduleError};
pub use summary::{
    compose as compose_report, run_failure_message, run_summary_message, BonusLine, OwnerMessage,
    PerformerLine, ReportContent, TeamRating,
};
