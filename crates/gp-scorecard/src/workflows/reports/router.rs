use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{error::Category, json};

use super::domain::ReportPeriod;
use super::runner::{MonthlyReportRunner, RunOutcome};

/// Manual trigger and status for the monthly report run.
pub fn monthly_report_router(runner: Arc<MonthlyReportRunner>) -> Router {
    Router::new()
        .route("/api/v1/reports/monthly/run", post(run_handler))
        .route("/api/v1/reports/monthly/status", get(status_handler))
        .with_state(runner)
}

/// Optional explicit period; both fields or neither. Neither means the previous month.
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

pub(crate) async fn run_handler(
    State(runner): State<Arc<MonthlyReportRunner>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match parse_run_request(&headers, &body) {
        Ok(request) => request,
        Err((status, message)) => return error_response(status, message),
    };

    let period = match (request.month, request.year) {
        (Some(month), Some(year)) => match ReportPeriod::new(month, year) {
            Some(period) => period,
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("month must be within 1..=12, found {month}"),
                )
            }
        },
        (None, None) => runner.period_at(Utc::now()),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "month and year must be given together".to_string(),
            )
        }
    };

    match runner.run_for(period).await {
        outcome @ RunOutcome::Completed(_) => (StatusCode::OK, Json(outcome)).into_response(),
        outcome @ RunOutcome::AlreadyRunning => {
            (StatusCode::CONFLICT, Json(outcome)).into_response()
        }
        outcome @ RunOutcome::Aborted { .. } => {
            (StatusCode::BAD_GATEWAY, Json(outcome)).into_response()
        }
    }
}

/// An empty body means "previous month"; anything else must be a valid JSON request.
fn parse_run_request(headers: &HeaderMap, body: &[u8]) -> Result<RunRequest, (StatusCode, String)> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunRequest::default());
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"));
    if !is_json {
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "expected an application/json body".to_string(),
        ));
    }

    serde_json::from_slice(body).map_err(|err| {
        let status = match err.classify() {
            Category::Data => StatusCode::UNPROCESSABLE_ENTITY,
            Category::Syntax | Category::Eof | Category::Io => StatusCode::BAD_REQUEST,
        };
        (status, format!("invalid run request: {err}"))
    })
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub(crate) async fn status_handler(State(runner): State<Arc<MonthlyReportRunner>>) -> Response {
    let payload = json!({
        "status": runner.status().label(),
        "timezone": runner.timezone().name(),
        "target_period": runner.period_at(Utc::now()).to_string(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}
