// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-crate debug flags
//!
//! Sources, merged: `--debug-<crate>` / `--debug-all` arguments and the
//! comma-separated [`DEBUG_ENV`] variable (`all` enables every known crate).

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Environment variable listing crates to debug
pub const DEBUG_ENV: &str = "SURFACE_OVERLAY_DEBUG";

const FLAG_PREFIX: &str = "--debug-";

/// Crates whose `tracing` target is raised to `debug`
///
/// ```rust
/// use surface_overlay_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_sources(["--debug-surface-overlay-engine".to_string()], None);
/// assert!(flags.is_enabled("surface-overlay-engine"));
/// assert_eq!(flags.to_filter_string(), "surface-overlay-engine=debug,info");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    enabled: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Merge command-line arguments with an optional [`DEBUG_ENV`] value
    pub fn from_sources<I>(args: I, env_value: Option<&str>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = Self::default();
        for arg in args {
            match arg.strip_prefix(FLAG_PREFIX) {
                Some("all") => flags.enable_all(),
                Some(crate_name) if !crate_name.is_empty() => flags.enable(crate_name),
                _ => {}
            }
        }
        match env_value.map(str::trim) {
            Some("all") => flags.enable_all(),
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .for_each(|name| flags.enable(name)),
            None => {}
        }
        flags
    }

    /// Arguments only
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self::from_sources(args, None)
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled.insert(crate_name.to_string());
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled.contains(crate_name)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled.is_empty()
    }

    /// Enabled crate names in sorted order
    pub fn enabled_crates(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().map(String::as_str)
    }

    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// `EnvFilter` directives: one `<crate>=debug` per enabled crate, then
    /// `default_level` for everything else
    pub fn to_filter_string_with_default(&self, default_level: &str) -> String {
        self.enabled_crates()
            .map(|name| format!("{}=debug", name))
            .chain(std::iter::once(default_level.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn to_filter_string(&self) -> String {
        self.to_filter_string_with_default("info")
    }
}

/// Flags from the process arguments and [`DEBUG_ENV`]
pub fn parse_debug_flags() -> CrateDebugFlags {
    let env_value = env::var(DEBUG_ENV).ok();
    CrateDebugFlags::from_sources(env::args(), env_value.as_deref())
}

/// Usage text for the debug flags
pub fn debug_flags_help() -> String {
    let mut help = String::from("Debug Flags:\n");
    help.push_str("  --debug-all                Debug logging for every crate\n");
    help.push_str("  --debug-<crate>            Debug logging for one crate\n\nCrates:\n");
    for crate_name in KNOWN_CRATES {
        help.push_str(&format!("  {}\n", crate_name));
    }
    help.push_str(&format!("\nEnvironment:\n  {}=<crate>[,<crate>] | all\n", DEBUG_ENV));
    help
}
