// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod storage;
pub mod version;
pub mod vision;

pub use api::{create_app, AppState};
pub use config::ServerConfig;
pub use storage::{StagedFile, StagingDir};
pub use vision::detection::{DetectionModel, DetectionRecord, YoloModel};
