use std::borrow::Cow;

use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::repository::RepositoryError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ErrorVerbosity {
    /// Server returns only the appropriate status code.
    StatusCode,
    /// Server returns only the message with the appropriate status code.
    Message,
    /// Server returns the message, the underlying error text and the appropriate status code.
    #[default]
    Full,
}

impl ErrorVerbosity {
    pub fn should_generate_message(&self) -> bool {
        matches!(self, ErrorVerbosity::Message | ErrorVerbosity::Full)
    }

    pub fn should_generate_error_reason(&self) -> bool {
        matches!(self, ErrorVerbosity::Full)
    }
}

pub trait ErrorVerbosityProvider {
    /// Returns the error verbosity.
    fn error_verbosity(&self) -> ErrorVerbosity;
}

#[derive(Debug, Serialize)]
struct ApiErrorResponse {
    message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_schema: Option<String>,
}

#[derive(Debug, From)]
/// API error
pub enum ApiError {
    /// Internal server error
    ///
    /// This error is returned when something outside of the storage layer fails.
    InternalServerError(InternalServerError),
    /// Query error
    ///
    /// This error is returned when the query parameters are not as expected.
    Query(QueryError),
    /// Body error
    ///
    /// This error is returned when the body is not as expected.
    Body(BodyError),
    /// Path error
    ///
    /// This error is returned when the path is not as expected.
    Path(PathError),
    /// Validation error
    ///
    /// This error is returned when a required input is missing or a field is out of bounds.
    Validation(ValidationError),
    /// Method not allowed
    MethodNotAllowed(MethodNotAllowedError),
    /// Not found error
    ///
    /// This error is returned when the requested route or book does not exist.
    NotFound(NotFoundError),
    /// Storage error
    ///
    /// This error is returned when the persistence layer fails.
    Storage(StorageError),
}

impl ApiError {
    /// Maps a [`RepositoryError`] to a 404 or a 500 carrying `message`.
    pub fn from_repository_error(
        verbosity: ErrorVerbosity,
        message: &'static str,
        err: RepositoryError,
    ) -> Self {
        match err {
            RepositoryError::NotFound { id } => NotFoundError::book(verbosity, &id).into(),
            err => StorageError::new(verbosity, message, err).into(),
        }
    }

    fn verbosity(&self) -> ErrorVerbosity {
        match self {
            ApiError::InternalServerError(err) => err.verbosity,
            ApiError::Query(err) => err.verbosity,
            ApiError::Body(err) => err.verbosity,
            ApiError::Path(err) => err.verbosity,
            ApiError::Validation(err) => err.verbosity,
            ApiError::MethodNotAllowed(err) => err.verbosity,
            ApiError::NotFound(err) => err.verbosity,
            ApiError::Storage(err) => err.verbosity,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::InternalServerError(_) => "An internal server error has occurred",
            ApiError::Query(_) => "Failed to parse query parameters",
            ApiError::Body(_) => "Failed to parse request body",
            ApiError::Path(_) => "Failed to parse path parameters",
            ApiError::Validation(err) => err.message,
            ApiError::MethodNotAllowed(_) => "Method not allowed",
            ApiError::NotFound(err) => err.message,
            ApiError::Storage(err) => err.message,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InternalServerError(_) | ApiError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Query(_) | ApiError::Body(_) | ApiError::Path(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn into_reason(self) -> (Option<String>, Option<String>) {
        match self {
            ApiError::InternalServerError(err) => (err.internal_server_error, None),
            ApiError::Query(err) => (err.query_error_reason, None),
            ApiError::Body(err) => (err.body_error_reason, err.body_expected_schema),
            ApiError::Path(err) => (err.path_error_reason, None),
            ApiError::Validation(err) => (err.validation_error_reason, None),
            ApiError::MethodNotAllowed(_) => (None, None),
            ApiError::NotFound(err) => (err.not_found_reason, None),
            ApiError::Storage(err) => (err.storage_error_reason, None),
        }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        let message = Cow::Borrowed(error.message());
        let (error, expected_schema) = error.into_reason();

        ApiErrorResponse {
            message,
            error,
            expected_schema,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let verbosity = self.verbosity();

        if !verbosity.should_generate_message() {
            return status_code.into_response();
        }

        (status_code, Json(ApiErrorResponse::from(self))).into_response()
    }
}

/// Maps a [`RepositoryError`] into an [`ApiError`] using the error verbosity of the given state.
///
/// Use with `map_err`.
#[macro_export]
macro_rules! repository_error {
    ($state:expr, $message:expr) => {
        |err| {
            $crate::error::ApiError::from_repository_error(
                $crate::error::ErrorVerbosityProvider::error_verbosity(&$state),
                $message,
                err,
            )
        }
    };
}

#[derive(Debug)]
pub struct InternalServerError {
    verbosity: ErrorVerbosity,
    internal_server_error: Option<String>,
}

impl InternalServerError {
    pub fn from_generic_error<E: Into<anyhow::Error>>(verbosity: ErrorVerbosity, err: E) -> Self {
        let err: anyhow::Error = err.into();
        let err = format!("{err:#}");
        tracing::error!(%err, "Internal server error");

        let internal_server_error = verbosity.should_generate_error_reason().then_some(err);

        InternalServerError {
            verbosity,
            internal_server_error,
        }
    }
}

#[derive(Debug)]
pub struct QueryError {
    verbosity: ErrorVerbosity,
    query_error_reason: Option<String>,
}

impl QueryError {
    pub fn new(verbosity: ErrorVerbosity, query_error_reason: String) -> Self {
        let query_error_reason = verbosity
            .should_generate_error_reason()
            .then_some(query_error_reason);

        QueryError {
            verbosity,
            query_error_reason,
        }
    }
}

#[derive(Debug)]
pub struct BodyError {
    verbosity: ErrorVerbosity,
    body_error_reason: Option<String>,
    body_expected_schema: Option<String>,
}

impl BodyError {
    pub fn new(
        verbosity: ErrorVerbosity,
        body_error_reason: String,
        body_expected_schema: String,
    ) -> Self {
        let (body_error_reason, body_expected_schema) =
            match verbosity.should_generate_error_reason() {
                true => (Some(body_error_reason), Some(body_expected_schema)),
                false => (None, None),
            };

        BodyError {
            verbosity,
            body_error_reason,
            body_expected_schema,
        }
    }
}

#[derive(Debug)]
pub struct PathError {
    verbosity: ErrorVerbosity,
    path_error_reason: Option<String>,
}

impl PathError {
    pub fn from_path_rejection(verbosity: ErrorVerbosity, rejection: PathRejection) -> Self {
        let path_error_reason = verbosity
            .should_generate_error_reason()
            .then(|| rejection.body_text());

        PathError {
            verbosity,
            path_error_reason,
        }
    }
}

#[derive(Debug)]
pub struct ValidationError {
    verbosity: ErrorVerbosity,
    message: &'static str,
    validation_error_reason: Option<String>,
}

impl ValidationError {
    /// A required query parameter is absent. Never carries a reason.
    pub fn missing_query(verbosity: ErrorVerbosity) -> Self {
        ValidationError {
            verbosity,
            message: "Search query is required",
            validation_error_reason: None,
        }
    }

    pub fn from_validation_errors(
        verbosity: ErrorVerbosity,
        errors: validator::ValidationErrors,
    ) -> Self {
        let validation_error_reason = verbosity
            .should_generate_error_reason()
            .then(|| errors.to_string());

        ValidationError {
            verbosity,
            message: "Invalid book fields",
            validation_error_reason,
        }
    }
}

#[derive(Debug)]
pub struct MethodNotAllowedError {
    verbosity: ErrorVerbosity,
}

impl MethodNotAllowedError {
    pub fn new(verbosity: ErrorVerbosity) -> Self {
        MethodNotAllowedError { verbosity }
    }
}

#[derive(Debug)]
pub struct NotFoundError {
    verbosity: ErrorVerbosity,
    message: &'static str,
    not_found_reason: Option<String>,
}

impl NotFoundError {
    /// No route matches the requested path.
    pub fn route(verbosity: ErrorVerbosity) -> Self {
        NotFoundError {
            verbosity,
            message: "The requested resource was not found",
            not_found_reason: None,
        }
    }

    /// No book is stored under `id`.
    pub fn book(verbosity: ErrorVerbosity, id: &str) -> Self {
        tracing::debug!(%id, "Book not found");

        let not_found_reason = verbosity
            .should_generate_error_reason()
            .then(|| format!("No book with id `{id}`"));

        NotFoundError {
            verbosity,
            message: "Book not found",
            not_found_reason,
        }
    }
}

#[derive(Debug)]
pub struct StorageError {
    verbosity: ErrorVerbosity,
    message: &'static str,
    storage_error_reason: Option<String>,
}

impl StorageError {
    pub fn new(verbosity: ErrorVerbosity, message: &'static str, err: RepositoryError) -> Self {
        let err = err.to_string();
        tracing::error!(%err, message, "Storage error");

        let storage_error_reason = verbosity.should_generate_error_reason().then_some(err);

        StorageError {
            verbosity,
            message,
            storage_error_reason,
        }
    }
}
