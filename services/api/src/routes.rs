use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use gp_scorecard::workflows::bonus::{bonus_router, BonusCalculator};
use gp_scorecard::workflows::intake::intake_router;
use gp_scorecard::workflows::reports::{monthly_report_router, MonthlyReportRunner};
use serde_json::json;

use crate::infra::AppState;

/// Every workflow router plus the operational endpoints.
pub(crate) fn service_routes(
    calculator: BonusCalculator,
    runner: Arc<MonthlyReportRunner>,
) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(bonus_router(calculator))
        .merge(intake_router())
        .merge(monthly_report_router(runner))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    if ready {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
