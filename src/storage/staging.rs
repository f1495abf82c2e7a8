// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Staging directory for uploaded images
//!
//! Uploads are written to `<staging_dir>/<sanitized_name>` and handed to the
//! detector by path. Nothing here deletes files; retention is left to the
//! operator.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Prefix for names generated when the client filename sanitizes to nothing
pub const GENERATED_NAME_PREFIX: &str = "upload_";

/// Device names Windows refuses to create as regular files
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "LPT1", "LPT2", "LPT3",
];

/// Errors raised while staging an upload
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Failed to create staging directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write staged file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An upload persisted to the staging directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Sanitized (or generated) file name
    pub file_name: String,
    /// Full path the bytes were written to
    pub path: PathBuf,
    /// Directory that owns the file
    pub directory: PathBuf,
}

/// Derive a filesystem-safe name from an untrusted client filename.
///
/// Returns an empty string when nothing usable survives; callers substitute a
/// generated name in that case (see [`staged_name`]).
pub fn sanitize_filename(raw: &str) -> String {
    // NFKD splits accented letters into base letter plus combining marks
    let ascii: String = raw
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return String::new();
    }

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_NAMES.contains(&stem.to_ascii_uppercase().as_str()) {
        return format!("_{}", trimmed);
    }

    trimmed.to_string()
}

/// Generate a unique name for uploads whose filename sanitized to nothing
pub fn generated_name() -> String {
    format!("{}{}", GENERATED_NAME_PREFIX, Uuid::new_v4().simple())
}

/// Sanitize `raw`, falling back to a generated name when the result is empty
pub fn staged_name(raw: &str) -> String {
    let name = sanitize_filename(raw);
    if name.is_empty() {
        generated_name()
    } else {
        name
    }
}

/// Append-only directory that receives uploads before inference
#[derive(Debug, Clone)]
pub struct StagingDir {
    root: PathBuf,
}

impl StagingDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory (and parents) if it does not exist yet
    pub async fn ensure(&self) -> Result<(), StagingError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StagingError::CreateDir {
                path: self.root.clone(),
                source,
            })
    }

    /// Write `bytes` under a name derived from `client_filename`.
    ///
    /// An existing file with the same name is overwritten.
    pub async fn stage(
        &self,
        client_filename: &str,
        bytes: &[u8],
    ) -> Result<StagedFile, StagingError> {
        self.ensure().await?;

        let file_name = staged_name(client_filename);
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StagingError::Write {
                path: path.clone(),
                source,
            })?;

        debug!(
            "Staged {} bytes as {} (client name: {:?})",
            bytes.len(),
            path.display(),
            client_filename
        );

        Ok(StagedFile {
            file_name,
            path,
            directory: self.root.clone(),
        })
    }
}

/// Create the staging directory at startup
pub async fn prepare_staging_dir<P: Into<PathBuf>>(root: P) -> Result<StagingDir, StagingError> {
    let staging = StagingDir::new(root);
    staging.ensure().await?;
    info!("Staging directory ready at {}", staging.root().display());
    Ok(staging)
}
