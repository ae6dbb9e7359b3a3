//! Health endpoint
//!
//! Read-only composite probe. Always answers 200; the body carries the
//! reduced status and the per-service breakdown.

use axum::{extract::State, http::StatusCode, Json};

use catalog_core::services::HealthReport;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check().await;
    (StatusCode::OK, Json(report))
}
