// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # surface-overlay-observability
//!
//! Logging infrastructure shared by the surface overlay crates, with
//! per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: timestamped per-run log folders with retention

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known crate names for debug flags
///
/// Each crate logs under its own name as `tracing` target.
pub const KNOWN_CRATES: &[&str] = &[
    "surface-overlay",
    "surface-overlay-engine",
    "surface-overlay-config",
];
