use axum::{middleware::from_fn_with_state, Router};

use crate::{
    middleware::{
        method_not_allowed::method_not_allowed, not_found::not_found,
        trace_response_body::trace_response_body,
    },
    state::ApiState,
};

pub mod books;
pub mod health;
pub mod search;

/// All routes of the API, without the transport layers added by [`crate::server::Server`].
pub fn app(state: ApiState) -> Router {
    Router::<ApiState>::new()
        .merge(health::app::app())
        .merge(books::app::app())
        .merge(search::app::app())
        .fallback(not_found)
        .layer(from_fn_with_state(
            state.clone(),
            method_not_allowed::<ApiState>,
        ))
        .layer(from_fn_with_state(state.clone(), trace_response_body))
        .with_state(state)
}
