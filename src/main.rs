// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ai_provider::{
    api::{start_server, AppState},
    config::ServerConfig,
    storage::prepare_staging_dir,
    version,
    vision::{DetectionModel, YoloModel},
};
use anyhow::{Context, Result};
use clap::Parser;
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServerConfig::parse();

    println!("🚀 Starting {}...\n", version::get_version_string());
    println!("   Model:      {}", config.model_path.display());
    println!("   Upload dir: {}", config.upload_dir.display());
    println!("   Listen:     {}", config.listen_addr());
    println!();

    let staging = prepare_staging_dir(&config.upload_dir)
        .await
        .context("Failed to prepare staging directory")?;

    println!("🧠 Loading detection model...");
    let model_path = config.model_path.clone();
    let model = tokio::task::spawn_blocking(move || YoloModel::load(model_path))
        .await
        .context("Model loading task panicked")?
        .context("Failed to load detection model")?;
    println!("✅ Detection model ready");

    let model: Arc<dyn DetectionModel> = Arc::new(model);
    let state = AppState::new(model, staging);

    start_server(&config, state).await?;

    println!("👋 Goodbye!");
    Ok(())
}
