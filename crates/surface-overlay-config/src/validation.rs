// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are within the ranges the engine accepts.

use crate::{ConfigError, ConfigResult, LoggingConfig, OverlayConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &OverlayConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_smoothing(config, &mut errors);
    validate_correlation(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_smoothing(config: &OverlayConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.smoothing.default_steps == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "smoothing.default_steps".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_correlation(config: &OverlayConfig, errors: &mut Vec<ConfigValidationError>) {
    let coefficient = config.correlation.degenerate_coefficient;
    if !coefficient.is_finite() || !(-1.0..=1.0).contains(&coefficient) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "correlation.degenerate_coefficient".to_string(),
            reason: "must be a finite value between -1.0 and 1.0".to_string(),
        });
    }

    let interval = config.correlation.progress_interval_percent;
    if interval == 0 || interval > 100 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "correlation.progress_interval_percent".to_string(),
            reason: "must be between 1 and 100".to_string(),
        });
    }
}

fn validate_logging(config: &OverlayConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.logging.level.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "logging.level".to_string(),
        });
    } else if !LoggingConfig::LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LoggingConfig::LEVELS.join(", ")),
        });
    }
}
