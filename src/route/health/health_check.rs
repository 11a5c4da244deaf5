use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    pub message: &'static str,
    pub active_status: bool,
    pub error: bool,
}

impl IntoResponse for HealthCheckResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Reports that the server is up. Does not touch the database.
pub async fn health_check() -> HealthCheckResponse {
    HealthCheckResponse {
        message: "Server is running successfully.",
        active_status: true,
        error: false,
    }
}
