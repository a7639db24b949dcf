use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::{BonusCalculationInput, BonusCalculator, ProjectionInput, TargetLevel};

/// Router exposing the calculator over HTTP.
pub fn bonus_router(calculator: BonusCalculator) -> Router {
    Router::new()
        .route("/api/v1/bonus/eligibility", post(eligibility_handler))
        .route("/api/v1/bonus/projection", post(projection_handler))
        .route("/api/v1/bonus/gap", post(gap_handler))
        .with_state(calculator)
}

pub(crate) async fn eligibility_handler(
    State(calculator): State<BonusCalculator>,
    Json(input): Json<BonusCalculationInput>,
) -> Response {
    (StatusCode::OK, Json(calculator.eligibility(&input))).into_response()
}

pub(crate) async fn projection_handler(
    State(calculator): State<BonusCalculator>,
    Json(input): Json<ProjectionInput>,
) -> Response {
    (StatusCode::OK, Json(calculator.projection(&input))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct GapRequest {
    pub current_ggs: u64,
    pub target_level: TargetLevel,
}

pub(crate) async fn gap_handler(
    State(calculator): State<BonusCalculator>,
    Json(request): Json<GapRequest>,
) -> Response {
    let gap = calculator.gap_to_level(request.current_ggs, request.target_level);
    (StatusCode::OK, Json(gap)).into_response()
}
