use std::{ops::Deref, sync::Arc};

use crate::{
    error::{ErrorVerbosity, ErrorVerbosityProvider},
    extractor::validated::{ValidationPolicy, ValidationPolicyProvider},
    repository::BookRepository,
};

#[derive(Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    pub fn new(
        error_verbosity: ErrorVerbosity,
        validation_policy: ValidationPolicy,
        books: Box<dyn BookRepository>,
    ) -> Self {
        Self {
            inner: Arc::new(ApiStateInner {
                error_verbosity,
                validation_policy,
                books,
            }),
        }
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct ApiStateInner {
    error_verbosity: ErrorVerbosity,
    validation_policy: ValidationPolicy,
    books: Box<dyn BookRepository>,
}

impl ApiStateInner {
    pub fn books(&self) -> &dyn BookRepository {
        self.books.as_ref()
    }
}

impl ErrorVerbosityProvider for ApiState {
    fn error_verbosity(&self) -> ErrorVerbosity {
        self.error_verbosity
    }
}

impl ValidationPolicyProvider for ApiState {
    fn validation_policy(&self) -> ValidationPolicy {
        self.validation_policy
    }
}
