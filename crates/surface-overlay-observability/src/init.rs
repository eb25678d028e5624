// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console logging is always available. With the `file-logging` feature each
//! run additionally gets a timestamped folder of JSON logs with retention.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingOptions};

/// Logging initialization result; keep alive for the lifetime of the process
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving log files, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

fn console_layer(
    options: &LoggingOptions,
    filter: EnvFilter,
) -> Box<dyn Layer<Registry> + Send + Sync> {
    match options.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    }
}

/// Initialize console logging only
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_console_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<LoggingGuard> {
    let filter = EnvFilter::new(debug_flags.to_filter_string_with_default(&options.default_level));
    Registry::default()
        .with(console_layer(options, filter))
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: Vec::new(),
        log_dir: None,
    })
}

/// Initialize console logging plus, when `options.log_dir` is set, per-run file logging
///
/// Creates a timestamped folder structure:
/// ```text
/// ./logs/
///   └── run_20250101_120000/
///       └── surface-overlay.log
/// ```
#[cfg(feature = "file-logging")]
pub fn init_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<LoggingGuard> {
    use anyhow::Context;
    use chrono::Utc;
    use tracing_appender::rolling;

    let Some(base_log_dir) = options.log_dir.clone() else {
        return init_console_logging(debug_flags, options);
    };

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let run_folder = base_log_dir.join(format!("run_{}", timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    cleanup_old_logs(&base_log_dir, options.retention_days, options.retention_runs)?;

    let filter_string = debug_flags.to_filter_string_with_default(&options.default_level);

    let appender = rolling::never(&run_folder, "surface-overlay.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .with_filter(EnvFilter::new(&filter_string))
        .boxed();

    Registry::default()
        .with(vec![
            console_layer(options, EnvFilter::new(&filter_string)),
            file_layer,
        ])
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(LoggingGuard {
        _file_guards: vec![guard],
        log_dir: Some(run_folder),
    })
}

/// Remove run folders older than `retention_days`, then keep at most `retention_runs`
#[cfg(feature = "file-logging")]
pub fn cleanup_old_logs(base_log_dir: &Path, retention_days: u64, retention_runs: usize) -> Result<()> {
    use chrono::{NaiveDateTime, Utc};

    if !base_log_dir.exists() {
        return Ok(());
    }

    let cutoff = Utc::now().naive_utc() - chrono::Duration::days(retention_days as i64);

    let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(stamp) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("run_"))
        else {
            continue;
        };
        if let Ok(dt) = NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S") {
            runs.push((path, dt));
        }
    }

    // Oldest first
    runs.sort_by_key(|(_, dt)| *dt);

    let mut survivors = Vec::new();
    for (path, dt) in runs {
        if dt < cutoff {
            if let Err(e) = std::fs::remove_dir_all(&path) {
                tracing::warn!("Failed to remove old log directory {}: {}", path.display(), e);
            }
        } else {
            survivors.push(path);
        }
    }

    if survivors.len() > retention_runs {
        let excess = survivors.len() - retention_runs;
        for path in survivors.iter().take(excess) {
            if let Err(e) = std::fs::remove_dir_all(path) {
                tracing::warn!("Failed to remove old log directory {}: {}", path.display(), e);
            }
        }
    }

    Ok(())
}

#[cfg(all(test, feature = "file-logging"))]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_keeps_most_recent_runs() {
        let dir = tempfile::tempdir().unwrap();
        let now = chrono::Utc::now();
        let mut names = Vec::new();
        for minutes in 0..4 {
            let stamp = (now - chrono::Duration::minutes(minutes)).format("%Y%m%d_%H%M%S");
            let name = format!("run_{}", stamp);
            std::fs::create_dir_all(dir.path().join(&name)).unwrap();
            names.push(name);
        }
        std::fs::create_dir_all(dir.path().join("run_20000101_000000")).unwrap();

        cleanup_old_logs(dir.path(), 30, 2).unwrap();

        assert!(!dir.path().join("run_20000101_000000").exists());
        // names[0] is the newest
        assert!(dir.path().join(&names[0]).exists());
        assert!(dir.path().join(&names[1]).exists());
        assert!(!dir.path().join(&names[3]).exists());
    }
}
