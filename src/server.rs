use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    decompression::RequestDecompressionLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use crate::{config::ServerConfig, repository, route, state::ApiState};

pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Connects the storage, then serves until CTRL+C or SIGTERM.
    ///
    /// Fails without binding if the storage is unreachable.
    pub async fn run(self) -> anyhow::Result<()> {
        let books = repository::connect(&self.config.storage)
            .await
            .inspect_err(|err| tracing::error!(%err, "Failed to connect to the database"))
            .context("Failed to connect to the database")?;

        let state = ApiState::new(
            self.config.error_verbosity,
            self.config.validation_policy,
            books,
        );

        let app = router(state, &self.config)?;

        let socket_address = self.config.socket_address();

        tracing::info!(addr = %socket_address, "Starting server");

        let listener = TcpListener::bind(&socket_address)
            .await
            .context("Bind failed")?;

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

        Ok(())
    }
}

/// The API routes wrapped in the transport layers.
pub fn router(state: ApiState, config: &ServerConfig) -> anyhow::Result<Router> {
    let cors = cors_layer(config.allowed_origin.as_deref())?;

    let app = route::app(state).layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                    .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                    .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
            )
            .layer(RequestDecompressionLayer::new())
            .layer(CompressionLayer::new())
            .layer(cors)
            .layer(TimeoutLayer::new(config.request_timeout())),
    );

    Ok(app)
}

/// Allows exactly `allowed_origin`, or no cross-origin caller at all.
fn cors_layer(allowed_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(allowed_origin) = allowed_origin else {
        tracing::debug!("No allowed origin configured, cross-origin requests are rejected");

        return Ok(CorsLayer::new());
    };

    // Browsers send the origin without a trailing slash.
    let origin = allowed_origin.trim_end_matches('/');
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("Invalid allowed origin: {allowed_origin}"))?;

    tracing::debug!(?origin, "Allowing cross-origin requests");

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(Any))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");

        tracing::info!("CTRL+C received");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;

        tracing::info!("SIGTERM received");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
