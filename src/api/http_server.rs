// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::detect::{detect_handler, MAX_UPLOAD_BYTES};
use crate::config::ServerConfig;
use crate::storage::StagingDir;
use crate::vision::DetectionModel;

/// Service name reported by `GET /`
pub const SERVICE_NAME: &str = "ai-provider";

/// Routes advertised by `GET /`
pub const ENDPOINTS: &[&str] = &["/healthz", "/detect"];

/// State shared by every request: the loaded model and the staging directory
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn DetectionModel>,
    pub staging: StagingDir,
}

impl AppState {
    pub fn new(model: Arc<dyn DetectionModel>, staging: StagingDir) -> Self {
        Self { model, staging }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceInfo {
    pub service: String,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/healthz", get(health_handler))
        .route("/detect", post(detect_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;

    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("⏹️  Shutting down...");
}

async fn root_handler() -> impl IntoResponse {
    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
