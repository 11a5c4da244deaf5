use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    book::{Book, NewBook},
    error::ApiError,
    extractor::{json::ApiJson, validated::Validated},
    repository_error,
    state::ApiState,
};

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct CreateBookResponse {
    pub book: Book,
}

impl IntoResponse for CreateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

pub async fn create_book(
    State(state): State<ApiState>,
    Validated(ApiJson(new_book)): Validated<ApiJson<NewBook>>,
) -> Result<CreateBookResponse, ApiError> {
    let book = state
        .books()
        .insert(new_book)
        .await
        .map_err(repository_error!(state, "Failed to create book"))?;

    tracing::debug!(id = %book.id, "Book created");

    Ok(CreateBookResponse { book })
}
