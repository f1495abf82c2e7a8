// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5050;
pub const DEFAULT_MODEL_PATH: &str = "yolov8n.onnx";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Object detection HTTP service
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "ai-provider")]
#[command(about = "Detect objects in uploaded images", long_about = None)]
pub struct ServerConfig {
    /// Interface to listen on
    #[arg(long, env = "AI_PROVIDER_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "AI_PROVIDER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Path to the YOLOv8 ONNX model
    #[arg(long = "model", env = "AI_PROVIDER_MODEL", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// Directory uploads are staged in before inference
    #[arg(long, env = "AI_PROVIDER_UPLOAD_DIR", default_value = DEFAULT_UPLOAD_DIR)]
    pub upload_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
