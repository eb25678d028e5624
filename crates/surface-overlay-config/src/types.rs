// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `surface_overlay.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub smoothing: SmoothingConfig,
    pub correlation: CorrelationConfig,
    pub logging: LoggingConfig,
}

/// Mesh smoothing defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Whether newly created overlay properties start with smoothing on
    pub enabled: bool,
    /// Iteration count used when a smoothing request passes `steps < 1`
    pub default_steps: u32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_steps: 5,
        }
    }
}

/// Correlation computation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Coefficient reported when either series has zero variance
    pub degenerate_coefficient: f32,
    /// Minimum percentage delta between two progress reports during volume reads
    pub progress_interval_percent: u8,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            degenerate_coefficient: 0.0,
            progress_interval_percent: 5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error
    pub level: String,
    /// Base directory for per-run log folders (file logging only)
    pub log_dir: PathBuf,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

impl LoggingConfig {
    /// Log levels accepted by validation
    pub const LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
}
