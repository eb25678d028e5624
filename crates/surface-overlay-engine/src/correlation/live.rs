// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Live correlation against a reference volume
//!
//! The reference volume is held weakly: if its owner drops it, the next
//! access reports it stale, clears the reference and the computation is
//! skipped.

use std::sync::{Arc, Weak};
use tracing::{debug, warn};

use super::pearson::pearson_correlation;
use crate::traits::ReferenceVolume;
use crate::types::{try_alloc, OverlayError, Result};

#[derive(Default)]
pub struct LiveCorrelation {
    enabled: bool,
    source: Option<Weak<dyn ReferenceVolume>>,
    /// Reference series sampled at the slice cursor (length F)
    source_series: Vec<f32>,
    /// One vertex's frame series (length F)
    vertex_series: Vec<f32>,
    degenerate: f32,
}

impl LiveCorrelation {
    pub fn new(degenerate: f32) -> Self {
        Self {
            degenerate,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Size the per-frame scratch buffers; nothing changes on failure
    pub(crate) fn allocate(&mut self, frame_count: usize) -> Result<()> {
        let source_series = try_alloc(frame_count)?;
        let vertex_series = try_alloc(frame_count)?;
        self.source_series = source_series;
        self.vertex_series = vertex_series;
        Ok(())
    }

    pub(crate) fn set_source(&mut self, source: &Arc<dyn ReferenceVolume>) {
        self.source = Some(Arc::downgrade(source));
    }

    pub(crate) fn clear_source(&mut self) {
        self.source = None;
    }

    pub fn has_source(&self) -> bool {
        self.source.as_ref().is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Upgrade the reference
    ///
    /// `Ok(None)` without a source; `StaleReference` (clearing it) once the
    /// volume has been dropped.
    pub(crate) fn source(&mut self) -> Result<Option<Arc<dyn ReferenceVolume>>> {
        let Some(weak) = self.source.as_ref() else {
            return Ok(None);
        };
        match weak.upgrade() {
            Some(source) => Ok(Some(source)),
            None => {
                self.source = None;
                Err(OverlayError::StaleReference)
            }
        }
    }

    /// Sample the reference series at the source's current slice position
    ///
    /// Returns false when the cursor maps outside the volume.
    fn sample(&mut self, source: &dyn ReferenceVolume) -> bool {
        let position = source.slice_position();
        let ras = source.target_to_ras(position);
        let index = source.ras_to_original_index(ras);
        let sampled = source.voxel_values_all_frames(index, &mut self.source_series);
        if !sampled {
            debug!(target: "surface-overlay-engine", "Slice cursor {:?} lies outside the reference volume", index);
        }
        sampled
    }

    /// Compute the per-vertex correlation map for `raw` (`N * F`, frame-major)
    ///
    /// `Ok(None)` means the computation was skipped (source gone, frame
    /// counts differ or cursor outside the volume).
    pub(crate) fn compute(
        &mut self,
        raw: &[f32],
        vertex_count: usize,
        frame_count: usize,
    ) -> Result<Option<Vec<f32>>> {
        let source = match self.source() {
            Ok(Some(source)) => source,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(target: "surface-overlay-engine", "{}; clearing correlation source", e);
                return Ok(None);
            }
        };
        let source_frames = source.frame_count();
        if source_frames != frame_count {
            debug!(
                target: "surface-overlay-engine",
                "Reference volume has {} frames, overlay has {}; skipping", source_frames, frame_count
            );
            return Ok(None);
        }
        if self.source_series.len() != frame_count || self.vertex_series.len() != frame_count {
            return Err(OverlayError::FrameCountMismatch {
                expected: frame_count,
                actual: self.source_series.len(),
            });
        }
        if !self.sample(source.as_ref()) {
            return Ok(None);
        }

        let mut coefficients = try_alloc(vertex_count)?;
        compute_correlation_map(
            raw,
            vertex_count,
            &self.source_series,
            &mut self.vertex_series,
            self.degenerate,
            &mut coefficients,
        );
        Ok(Some(coefficients))
    }
}

/// Correlate every vertex series of `raw` with `reference`
///
/// `raw[i + j * vertex_count]` is frame `j` of vertex `i`; `scratch` must be
/// `reference.len()` long.
pub fn compute_correlation_map(
    raw: &[f32],
    vertex_count: usize,
    reference: &[f32],
    scratch: &mut [f32],
    degenerate: f32,
    out: &mut [f32],
) {
    debug_assert_eq!(scratch.len(), reference.len());
    debug_assert_eq!(raw.len(), vertex_count * reference.len());
    for (vertex, coefficient) in out.iter_mut().enumerate().take(vertex_count) {
        for (frame, value) in scratch.iter_mut().enumerate() {
            *value = raw[vertex + frame * vertex_count];
        }
        *coefficient = pearson_correlation(reference, scratch, degenerate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_self_and_anti_correlation() {
        // 3 vertices x 4 frames; vertex 0 rises, vertex 1 falls, vertex 2 is flat
        let raw = vec![
            1.0, 4.0, 5.0, //
            2.0, 3.0, 5.0, //
            3.0, 2.0, 5.0, //
            4.0, 1.0, 5.0,
        ];
        let reference = [1.0, 2.0, 3.0, 4.0];
        let mut scratch = [0.0; 4];
        let mut out = [9.0; 3];

        compute_correlation_map(&raw, 3, &reference, &mut scratch, 0.0, &mut out);

        assert!((out[0] - 1.0).abs() < 1e-6);
        assert!((out[1] + 1.0).abs() < 1e-6);
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn test_dropped_source_is_stale_once() {
        let mut live = LiveCorrelation::new(0.0);
        live.allocate(2).unwrap();
        let data = ndarray::Array4::from_shape_vec((1, 1, 1, 2), vec![1.0, 2.0]).unwrap();
        let source: Arc<dyn ReferenceVolume> = Arc::new(crate::memory::InMemoryReferenceVolume::new(data));
        live.set_source(&source);
        assert!(live.has_source());

        drop(source);
        assert!(matches!(live.source(), Err(OverlayError::StaleReference)));
        assert!(live.source().unwrap().is_none());
        assert_eq!(live.compute(&[1.0, 2.0], 1, 2).unwrap(), None);
    }

    #[test]
    fn test_compute_without_source_is_noop() {
        let mut live = LiveCorrelation::new(0.0);
        live.allocate(2).unwrap();
        assert_eq!(live.compute(&[1.0, 2.0], 1, 2).unwrap(), None);
        assert!(!live.has_source());
    }
}
