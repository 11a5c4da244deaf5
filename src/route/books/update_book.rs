use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    book::{Book, BookPatch},
    error::ApiError,
    extractor::{json::ApiJson, path::ApiPath, validated::Validated},
    repository_error,
    state::ApiState,
};

use super::BookIdPath;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct UpdateBookResponse {
    pub book: Book,
}

impl IntoResponse for UpdateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Replaces the fields present in the body, the others keep their stored values.
pub async fn update_book(
    State(state): State<ApiState>,
    ApiPath(BookIdPath { id }): ApiPath<BookIdPath>,
    Validated(ApiJson(patch)): Validated<ApiJson<BookPatch>>,
) -> Result<UpdateBookResponse, ApiError> {
    let book = state
        .books()
        .update_by_id(&id, patch)
        .await
        .map_err(repository_error!(state, "Failed to update book"))?;

    tracing::debug!(%id, "Book updated");

    Ok(UpdateBookResponse { book })
}
