use axum::{http::Uri, response::Json};
use serde_json::{json, Value};

use crate::api::problem::{not_found, ProblemResponse};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Router fallback: every unmatched route is a 404 problem.
pub async fn route_not_found(uri: Uri) -> ProblemResponse {
    not_found(format!("Not Found - {}", uri.path()))
        .at(uri.path())
        .with_code("ROUTE_NOT_FOUND")
}
