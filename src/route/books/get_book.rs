use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    book::Book, error::ApiError, extractor::path::ApiPath, repository_error, state::ApiState,
};

use super::BookIdPath;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct GetBookResponse {
    pub book: Book,
}

impl IntoResponse for GetBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub async fn get_book(
    State(state): State<ApiState>,
    ApiPath(BookIdPath { id }): ApiPath<BookIdPath>,
) -> Result<GetBookResponse, ApiError> {
    let book = state
        .books()
        .get_by_id(&id)
        .await
        .map_err(repository_error!(state, "Failed to fetch book"))?;

    Ok(GetBookResponse { book })
}
