use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{ApiError, ErrorVerbosityProvider, MethodNotAllowedError};

/// Replaces axum's empty `405` with an [`ApiError`] body.
pub async fn method_not_allowed<S: ErrorVerbosityProvider>(
    State(state): State<S>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let res = next.run(req).await;

    if res.status() != StatusCode::METHOD_NOT_ALLOWED {
        return res;
    }

    tracing::warn!(%method, %path, "Method not allowed");

    ApiError::from(MethodNotAllowedError::new(state.error_verbosity())).into_response()
}
