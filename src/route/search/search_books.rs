use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    book::Book,
    error::{ApiError, ErrorVerbosityProvider, ValidationError},
    extractor::query::ApiQuery,
    repository_error,
    state::ApiState,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchBooksQuery {
    /// Text to look for in book titles, case-insensitive.
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct SearchBooksResponse {
    pub books: Vec<Book>,
}

impl IntoResponse for SearchBooksResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub async fn search_books(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<SearchBooksQuery>,
) -> Result<SearchBooksResponse, ApiError> {
    let Some(pattern) = query.query.filter(|query| !query.is_empty()) else {
        tracing::warn!("Rejection. Search query is missing");

        return Err(ValidationError::missing_query(state.error_verbosity()).into());
    };

    let books = state
        .books()
        .find_by_title_pattern(&pattern)
        .await
        .map_err(repository_error!(state, "Search failed"))?;

    tracing::debug!(%pattern, found = books.len(), "Searched books");

    Ok(SearchBooksResponse { books })
}
