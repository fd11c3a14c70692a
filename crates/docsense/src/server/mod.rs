//! HTTP server exposing the session, query and analysis core

pub mod routes;
pub mod state;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::HeaderValue,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{RagConfig, ServerConfig};
use crate::error::{Error, Result};
use crate::types::HealthResponse;
use state::AppState;

/// Docsense HTTP server
pub struct DocsenseServer {
    config: RagConfig,
    state: AppState,
}

impl DocsenseServer {
    /// Create a server with providers built from `config`
    pub fn new(config: RagConfig) -> Result<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = build_router(self.state)?;

        tracing::info!("Starting docsense server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config().server)?;
    let max_body_size = state.config().server.max_body_size;

    Ok(Router::new()
        .route("/health", get(health_check))
        .nest("/api", routes::api_routes())
        .with_state(state)
        // Middleware layers (applied bottom to top)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

fn cors_layer(config: &ServerConfig) -> Result<CorsLayer> {
    let origin = if config.cors_origin == "*" {
        AllowOrigin::from(Any)
    } else {
        let value = HeaderValue::from_str(&config.cors_origin)
            .map_err(|e| Error::Config(format!("Invalid CORS origin: {}", e)))?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.config().backend.as_str().to_string(),
        llm_model: state.llm().model().to_string(),
        sessions: state.store().len(),
    })
}
