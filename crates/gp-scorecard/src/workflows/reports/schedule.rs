use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info, warn};

use super::runner::{MonthlyReportRunner, RunOutcome};
use crate::config::ReportScheduleConfig;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("monthly report schedule already running")]
    AlreadyRunning,
    #[error("monthly report schedule not running")]
    NotRunning,
    #[error("failed to create job scheduler")]
    Create {
        #[source]
        source: JobSchedulerError,
    },
    #[error("invalid cron expression '{expression}'")]
    Register {
        expression: String,
        #[source]
        source: JobSchedulerError,
    },
    #[error("failed to start job scheduler")]
    Start {
        #[source]
        source: JobSchedulerError,
    },
    #[error("failed to stop job scheduler")]
    Stop {
        #[source]
        source: JobSchedulerError,
    },
}

/// Cron lifecycle around a [`MonthlyReportRunner`].
pub struct MonthlyReportSchedule {
    config: ReportScheduleConfig,
    runner: Arc<MonthlyReportRunner>,
    scheduler: Option<JobScheduler>,
}

impl MonthlyReportSchedule {
    pub fn new(config: ReportScheduleConfig, runner: Arc<MonthlyReportRunner>) -> Self {
        Self {
            config,
            runner,
            scheduler: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    pub async fn start(&mut self) -> Result<(), ScheduleError> {
        if self.is_running() {
            return Err(ScheduleError::AlreadyRunning);
        }

        let scheduler = JobScheduler::new()
            .await
            .map_err(|source| ScheduleError::Create { source })?;

        let runner = Arc::clone(&self.runner);
        let job = Job::new_async_tz(
            self.config.cron_expression.as_str(),
            self.config.timezone,
            move |_id, _lock| {
                let runner = Arc::clone(&runner);
                Box::pin(async move {
                    info!("cron triggered monthly report generation");
                    match runner.run_previous_month().await {
                        RunOutcome::Completed(summary) => info!(
                            period = %summary.period,
                            generated = summary.generated_count(),
                            skipped = summary.skipped_count(),
                            "scheduled monthly run finished"
                        ),
                        RunOutcome::AlreadyRunning => {
                            warn!("scheduled monthly run overlapped an active run")
                        }
                        RunOutcome::Aborted { period, reason } => {
                            error!(%period, %reason, "scheduled monthly run aborted")
                        }
                    }
                })
            },
        )
        .map_err(|source| ScheduleError::Register {
            expression: self.config.cron_expression.clone(),
            source,
        })?;

        scheduler
            .add(job)
            .await
            .map_err(|source| ScheduleError::Register {
                expression: self.config.cron_expression.clone(),
                source,
            })?;
        scheduler
            .start()
            .await
            .map_err(|source| ScheduleError::Start { source })?;

        info!(
            cron = %self.config.cron_expression,
            timezone = %self.config.timezone,
            "monthly report generation scheduled"
        );
        self.scheduler = Some(scheduler);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), ScheduleError> {
        let mut scheduler = self.scheduler.take().ok_or(ScheduleError::NotRunning)?;
        scheduler
            .shutdown()
            .await
            .map_err(|source| ScheduleError::Stop { source })?;
        info!("monthly report schedule stopped");
        Ok(())
    }
}
