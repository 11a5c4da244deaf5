use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use serde::Deserialize;
use validator::Validate;

use crate::error::{ApiError, ErrorVerbosityProvider, ValidationError};

use super::Extractor;

/// How strictly incoming book fields are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Fields are stored as sent.
    #[default]
    Lenient,
    /// Fields must pass their [`Validate`] rules.
    Strict,
}

pub trait ValidationPolicyProvider {
    /// Returns the validation policy.
    fn validation_policy(&self) -> ValidationPolicy;
}

/// An extractor that validates the data extracted by another extractor,
/// if the state's [`ValidationPolicy`] asks for it.
pub struct Validated<X>(pub X);

#[async_trait]
impl<X, S> FromRequest<S> for Validated<X>
where
    X: FromRequest<S, Rejection = ApiError> + Extractor,
    <X as Extractor>::Extracted: Validate,
    S: Send + Sync + ErrorVerbosityProvider + ValidationPolicyProvider,
{
    type Rejection = ApiError;

    #[tracing::instrument(name = "validated_extractor", skip_all)]
    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let inner = X::from_request(req, state).await?;

        if state.validation_policy() == ValidationPolicy::Lenient {
            return Ok(Validated(inner));
        }

        match inner.extracted().validate() {
            Ok(_) => {
                tracing::trace!("Validated");

                Ok(Validated(inner))
            }
            Err(errors) => {
                tracing::warn!(?errors, "Validation errors");

                let verbosity = state.error_verbosity();

                Err(ValidationError::from_validation_errors(verbosity, errors).into())
            }
        }
    }
}
