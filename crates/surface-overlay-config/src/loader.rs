// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones winning:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, OverlayConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SURFACE_OVERLAY_CONFIG_PATH";

/// Find the configuration file
///
/// Search order:
/// 1. `SURFACE_OVERLAY_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.clone();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from a TOML file and apply overrides
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// `FileNotFound` when searching fails, `ReadFailed` for an unreadable file
/// and `ParseError` for invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<OverlayConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file).map_err(|source| ConfigError::ReadFailed {
        path: config_file.clone(),
        source,
    })?;
    let mut config: OverlayConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    let lowered = value.to_lowercase();
    lowered == "true" || lowered == "1" || lowered == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SURFACE_OVERLAY_SMOOTH_ENABLED` -> `smoothing.enabled`
/// - `SURFACE_OVERLAY_SMOOTH_STEPS` -> `smoothing.default_steps`
/// - `SURFACE_OVERLAY_LOG_LEVEL` -> `logging.level`
/// - `SURFACE_OVERLAY_LOG_DIR` -> `logging.log_dir`
pub fn apply_environment_overrides(config: &mut OverlayConfig) {
    if let Ok(value) = env::var("SURFACE_OVERLAY_SMOOTH_ENABLED") {
        config.smoothing.enabled = parse_flag(&value);
    }
    if let Ok(value) = env::var("SURFACE_OVERLAY_SMOOTH_STEPS") {
        if let Ok(steps) = value.parse::<u32>() {
            config.smoothing.default_steps = steps;
        }
    }
    if let Ok(value) = env::var("SURFACE_OVERLAY_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("SURFACE_OVERLAY_LOG_DIR") {
        config.logging.log_dir = PathBuf::from(value);
    }
}

/// Apply CLI argument overrides to configuration
///
/// Recognised keys: `smooth`, `smooth_steps`, `degenerate_coefficient`, `log_level`.
pub fn apply_cli_overrides(config: &mut OverlayConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("smooth") {
        config.smoothing.enabled = parse_flag(value);
    }
    if let Some(value) = cli_args.get("smooth_steps") {
        if let Ok(steps) = value.parse::<u32>() {
            config.smoothing.default_steps = steps;
        }
    }
    if let Some(value) = cli_args.get("degenerate_coefficient") {
        if let Ok(coefficient) = value.parse::<f32>() {
            config.correlation.degenerate_coefficient = coefficient;
        }
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
