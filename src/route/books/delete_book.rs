use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{error::ApiError, extractor::path::ApiPath, repository_error, state::ApiState};

use super::BookIdPath;

#[derive(Debug, Serialize)]
pub struct DeleteBookResponse {
    pub message: &'static str,
}

impl IntoResponse for DeleteBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub async fn delete_book(
    State(state): State<ApiState>,
    ApiPath(BookIdPath { id }): ApiPath<BookIdPath>,
) -> Result<DeleteBookResponse, ApiError> {
    state
        .books()
        .delete_by_id(&id)
        .await
        .map_err(repository_error!(state, "Failed to delete book"))?;

    tracing::debug!(%id, "Book deleted");

    Ok(DeleteBookResponse {
        message: "Book is deleted successfully",
    })
}
