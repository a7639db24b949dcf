use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use gp_scorecard::config::AppConfig;
use gp_scorecard::error::AppError;
use gp_scorecard::telemetry;
use gp_scorecard::workflows::bonus::BonusCalculator;
use gp_scorecard::workflows::reports::{MonthlyReportRunner, MonthlyReportSchedule};
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::infra::{seeded_collaborators, AppState};
use crate::routes::service_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let calculator = BonusCalculator::default();
    let (collaborators, _store) = seeded_collaborators();
    let runner = Arc::new(
        MonthlyReportRunner::new(collaborators, &config.reports).with_calculator(calculator),
    );

    let mut schedule = MonthlyReportSchedule::new(config.reports.clone(), runner.clone());
    if config.reports.enabled {
        schedule.start().await?;
    } else {
        warn!("monthly report schedule disabled; manual trigger only");
    }

    let app = service_routes(calculator, runner)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "gp scorecard service ready");

    let served = axum::serve(listener, app).await;
    if schedule.is_running() {
        schedule.stop().await?;
    }
    served?;
    Ok(())
}
