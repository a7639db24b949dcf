use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::consistency::{self, ConsistencyReport};
use super::domain::{AttendanceRecord, ErrorReportRecord, EvaluationRecord, RecordKind};
use super::validation::{validate_batch, RecordValidator};
use crate::workflows::roster::{roster_match, FuzzyMatcher, NameMatch};

/// Stateless routes for upload validation, cross-checks, and roster lookups.
pub fn intake_router() -> Router {
    Router::new()
        .route("/api/v1/intake/:kind/validate", post(validate_handler))
        .route("/api/v1/intake/consistency", post(consistency_handler))
        .route("/api/v1/roster/match", post(roster_match_handler))
}

pub(crate) fn parse_kind(raw: &str) -> Option<RecordKind> {
    [
        RecordKind::Evaluations,
        RecordKind::Attendance,
        RecordKind::Errors,
    ]
    .into_iter()
    .find(|kind| kind.label() == raw)
}

pub(crate) async fn validate_handler(
    Path(kind): Path<String>,
    Json(rows): Json<Vec<Value>>,
) -> Response {
    let validator = RecordValidator;
    match parse_kind(&kind) {
        Some(RecordKind::Evaluations) => {
            let batch = validate_batch(&rows, |row| validator.evaluation(row));
            (StatusCode::OK, Json(batch)).into_response()
        }
        Some(RecordKind::Attendance) => {
            let batch = validate_batch(&rows, |row| validator.attendance(row));
            (StatusCode::OK, Json(batch)).into_response()
        }
        Some(RecordKind::Errors) => {
            let batch = validate_batch(&rows, |row| validator.error_report(row));
            (StatusCode::OK, Json(batch)).into_response()
        }
        None => {
            let payload = json!({
                "error": format!("unknown record kind '{kind}'"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConsistencyRequest {
    #[serde(default)]
    pub evaluations: Vec<EvaluationRecord>,
    #[serde(default)]
    pub errors: Vec<ErrorReportRecord>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
}

#[derive(Debug, Serialize)]
struct ConsistencyView {
    #[serde(flatten)]
    report: ConsistencyReport,
    requires_review: bool,
}

pub(crate) async fn consistency_handler(Json(request): Json<ConsistencyRequest>) -> Response {
    let report = consistency::check(&request.evaluations, &request.errors, &request.attendance);
    let view = ConsistencyView {
        requires_review: report.requires_review(),
        report,
    };
    (StatusCode::OK, Json(view)).into_response()
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Fuzzy,
    Roster,
}

#[derive(Debug, Deserialize)]
pub struct RosterMatchRequest {
    pub query: String,
    pub candidates: Vec<String>,
    #[serde(default)]
    pub mode: MatchMode,
}

#[derive(Debug, Serialize)]
struct RosterMatchView {
    matches: Vec<NameMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_match: Option<NameMatch>,
}

pub(crate) async fn roster_match_handler(Json(request): Json<RosterMatchRequest>) -> Response {
    let view = match request.mode {
        MatchMode::Fuzzy => {
            let matcher = FuzzyMatcher::default();
            RosterMatchView {
                matches: matcher.rank(&request.query, &request.candidates),
                best_match: matcher.best_match(&request.query, &request.candidates),
            }
        }
        MatchMode::Roster => RosterMatchView {
            matches: roster_match(&request.query, &request.candidates),
            best_match: None,
        },
    };
    (StatusCode::OK, Json(view)).into_response()
}
