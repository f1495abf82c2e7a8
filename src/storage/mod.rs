// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod staging;

pub use staging::{
    generated_name, prepare_staging_dir, sanitize_filename, staged_name, StagedFile, StagingDir,
    StagingError,
};
