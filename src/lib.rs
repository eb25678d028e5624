// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Surface Overlay
//!
//! Per-vertex scalar overlays for anatomical surface meshes: multi-frame
//! data, seeded correlation lookups, live Pearson correlation maps, mesh
//! smoothing and left/right hemisphere pairing.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! surface-overlay = "0.1"
//! ```
//!
//! ```rust
//! use std::sync::Arc;
//! use surface_overlay::prelude::*;
//! use surface_overlay::engine::memory::InMemorySurface;
//!
//! let adjacency = MeshAdjacency::from_neighbor_lists(&[vec![1], vec![0]]);
//! let surface = Arc::new(InMemorySurface::new(vec![0.5, 1.5], adjacency, Hemisphere::Left));
//! let overlay = SurfaceOverlay::with_config("thickness", surface, &OverlayConfig::default())?;
//! assert_eq!(overlay.range(), ValueRange::new(0.5, 1.5));
//! # Ok::<(), OverlayError>(())
//! ```
//!
//! ## Feature Flags
//! - **`file-logging`**: per-run JSON log files with retention cleanup
//!
//! ## Crates
//! - [`config`]: `surface_overlay.toml` loading with environment and CLI overrides
//! - [`engine`]: buffers, correlation, smoothing and pairing
//! - [`observability`]: logging setup with per-crate debug flags

use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub use surface_overlay_config as config;
pub use surface_overlay_engine as engine;
pub use surface_overlay_observability as observability;

use config::{ConfigResult, LoggingConfig, OverlayConfig};
use observability::{LogFormat, LoggingOptions};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load `surface_overlay.toml` (searched for when `path` is `None`), apply
/// environment and CLI overrides, then validate
///
/// # Errors
///
/// Returns the loader's error or an aggregated validation error.
pub fn load_validated_config(
    path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<OverlayConfig> {
    let config = config::load_config(path, cli_args)?;
    config::validate_config(&config)?;
    info!(
        target: "surface-overlay",
        "Loaded overlay configuration (smoothing: {}, {} steps)",
        config.smoothing.enabled,
        config.smoothing.default_steps
    );
    Ok(config)
}

/// Logging options for the `[logging]` section
pub fn logging_options(logging: &LoggingConfig, format: LogFormat) -> LoggingOptions {
    LoggingOptions {
        default_level: logging.level.clone(),
        format,
        log_dir: Some(logging.log_dir.clone()),
        retention_days: logging.retention_days,
        retention_runs: logging.retention_runs,
    }
}

/// Prelude with the commonly used types
pub mod prelude {
    pub use crate::config::{OverlayConfig, SmoothingConfig};
    pub use crate::engine::{
        pair_overlays, BasicOverlayProperty, CorrelationVolume, Hemisphere, HemisphereSelector, MeshAdjacency,
        OverlayError, OverlayHandle, OverlayObserver, OverlayProperty, ProgressSink, ReferenceVolume,
        SharedProperty, SurfaceAccess, SurfaceOverlay, ValueRange, VolumeReader,
    };
    pub use crate::observability::{CrateDebugFlags, LogFormat, LoggingOptions};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_logging_options_follow_config() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            log_dir: PathBuf::from("/tmp/overlay-logs"),
            retention_days: 3,
            retention_runs: 2,
        };
        let options = logging_options(&logging, LogFormat::Json);
        assert_eq!(options.default_level, "debug");
        assert_eq!(options.format, LogFormat::Json);
        assert_eq!(options.log_dir, Some(PathBuf::from("/tmp/overlay-logs")));
        assert_eq!(options.retention_runs, 2);
    }
}
