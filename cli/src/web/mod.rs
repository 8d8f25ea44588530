//! Browser form shell
//!
//! # Routes
//!
//! - `GET /` - search form
//! - `POST /search` - run the form query and render the results page
//! - `POST /api/search` - JSON variant of `/search`
//! - `GET /health` - liveness

pub mod error;
pub mod form;
pub mod handlers;
pub mod templates;

use crate::config::LoadedConfig;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use handlebars::Handlebars;
use scout_core::AgentBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

type BuilderFactory = dyn Fn() -> AgentBuilder + Send + Sync;

/// State shared by the handlers. Nothing query-specific lives here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LoadedConfig>,
    agents: Arc<BuilderFactory>,
    /// Held for the whole run so one query finishes before the next starts
    gate: Arc<Mutex<()>>,
    templates: Arc<Handlebars<'static>>,
}

impl AppState {
    pub fn new(config: LoadedConfig) -> Result<Self> {
        let config = Arc::new(config);
        let for_builder = Arc::clone(&config);
        Ok(Self {
            agents: Arc::new(move || for_builder.agent_builder()),
            config,
            gate: Arc::new(Mutex::new(())),
            templates: Arc::new(templates::registry().context("Failed to load page templates")?),
        })
    }

    /// Replace how a fresh agent is set up for each request
    pub fn with_agent_builder<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> AgentBuilder + Send + Sync + 'static,
    {
        self.agents = Arc::new(factory);
        self
    }
}

/// Build the router with every route
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/search", post(handlers::search))
        .route("/api/search", post(handlers::api_search))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: LoadedConfig, addr: SocketAddr) -> Result<()> {
    let app = router(AppState::new(config)?);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
