// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Overlay display property
//!
//! The property object holds the user-facing settings of an overlay
//! (smoothing, display range) and turns scalar values into colors. Paired
//! hemisphere overlays share a single property through [`SharedProperty`].

use parking_lot::RwLock;
use std::sync::Arc;
use surface_overlay_config::SmoothingConfig;

use crate::types::ValueRange;

/// Display settings and color mapping for an overlay
pub trait OverlayProperty: Send + Sync {
    fn smooth_enabled(&self) -> bool;

    fn set_smooth_enabled(&mut self, enabled: bool);

    fn smooth_steps(&self) -> u32;

    /// Restore display defaults for data spanning `data_range`
    fn reset(&mut self, data_range: ValueRange);

    /// Write one RGBA quadruple per value of `data` into `colors`
    fn map_overlay_color(&self, data: &[f32], colors: &mut [u8]);
}

/// Shared-ownership handle; lives as long as its longest holder
pub type SharedProperty = Arc<RwLock<dyn OverlayProperty>>;

/// Minimal property: smoothing settings plus a linear grey ramp over the display range
#[derive(Debug, Clone, PartialEq)]
pub struct BasicOverlayProperty {
    smooth: bool,
    smooth_steps: u32,
    display_range: ValueRange,
    reset_count: usize,
}

impl BasicOverlayProperty {
    pub fn from_config(config: &SmoothingConfig) -> Self {
        Self {
            smooth: config.enabled,
            smooth_steps: config.default_steps,
            display_range: ValueRange::default(),
            reset_count: 0,
        }
    }

    pub fn into_shared(self) -> SharedProperty {
        Arc::new(RwLock::new(self))
    }

    pub fn set_smooth_steps(&mut self, steps: u32) {
        self.smooth_steps = steps;
    }

    pub fn display_range(&self) -> ValueRange {
        self.display_range
    }

    /// Number of times defaults were restored
    pub fn reset_count(&self) -> usize {
        self.reset_count
    }
}

impl Default for BasicOverlayProperty {
    fn default() -> Self {
        Self::from_config(&SmoothingConfig::default())
    }
}

impl OverlayProperty for BasicOverlayProperty {
    fn smooth_enabled(&self) -> bool {
        self.smooth
    }

    fn set_smooth_enabled(&mut self, enabled: bool) {
        self.smooth = enabled;
    }

    fn smooth_steps(&self) -> u32 {
        self.smooth_steps
    }

    fn reset(&mut self, data_range: ValueRange) {
        self.display_range = data_range;
        self.reset_count += 1;
    }

    fn map_overlay_color(&self, data: &[f32], colors: &mut [u8]) {
        let span = self.display_range.span();
        for (rgba, &value) in colors.chunks_exact_mut(4).zip(data) {
            let t = if span > 0.0 {
                ((value as f64 - self.display_range.min) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let grey = (t * 255.0).round() as u8;
            rgba.copy_from_slice(&[grey, grey, grey, 255]);
        }
    }
}
