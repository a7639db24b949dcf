use std::time::Duration;

use super::common::*;
use crate::config::ReportScheduleConfig;
use crate::workflows::reports::{MonthlyReportSchedule, ScheduleError};

fn idle_runner() -> Harness {
    harness(
        MemoryDirectory::default(),
        MemoryStats::default(),
        MemoryNotifier::default(),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn start_and_stop_follow_the_lifecycle() {
    let h = idle_runner();
    let mut schedule = MonthlyReportSchedule::new(ReportScheduleConfig::default(), h.runner.clone());

    assert!(matches!(schedule.stop().await, Err(ScheduleError::NotRunning)));

    schedule.start().await.expect("schedule starts");
    assert!(schedule.is_running());
    assert!(matches!(
        schedule.start().await,
        Err(ScheduleError::AlreadyRunning)
    ));

    schedule.stop().await.expect("schedule stops");
    assert!(!schedule.is_running());
}

#[tokio::test]
async fn malformed_cron_is_rejected() {
    let h = idle_runner();
    let config = ReportScheduleConfig {
        cron_expression: "every first monday".to_string(),
        ..ReportScheduleConfig::default()
    };
    let mut schedule = MonthlyReportSchedule::new(config, h.runner.clone());

    match schedule.start().await {
        Err(ScheduleError::Register { expression, .. }) => {
            assert_eq!(expression, "every first monday")
        }
        other => panic!("expected registration failure, got {other:?}"),
    }
    assert!(!schedule.is_running());
}
