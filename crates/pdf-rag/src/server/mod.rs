//! HTTP boundary for the ingestion service

pub mod routes;
pub mod state;

use axum::http::HeaderValue;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::IngestConfig;
use crate::error::{Error, Result};
use state::AppState;

/// Ingestion HTTP server
pub struct IngestServer {
    config: IngestConfig,
    state: AppState,
}

impl IngestServer {
    /// Create a server over already-constructed state
    pub fn new(config: IngestConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes
    fn build_router(&self) -> Result<Router> {
        let origin: HeaderValue = self.config.server.allowed_origin.parse().map_err(|_| {
            Error::InvalidConfiguration(format!(
                "invalid allowed_origin '{}'",
                self.config.server.allowed_origin
            ))
        })?;

        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any);

        Ok(Router::new()
            .route("/health", get(health_check))
            .nest("/api", routes::api_routes(self.config.server.max_upload_size))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(cors))
    }

    /// Start serving until the process is stopped
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| Error::InvalidConfiguration(format!("invalid address: {}", e)))?;

        let router = self.build_router()?;

        tracing::info!("Starting ingestion server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
