// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ScalarBuffer
//!
//! Owns the raw vertex × frame matrix of one overlay plus its derived views:
//! - `raw`: `N * F` values, frame-major (`raw[frame * N + vertex]`)
//! - `active`: the `N` values currently displayed
//! - `unsmoothed`: `active` before smoothing
//! - `range`: bounds of `active`, recomputed on every mutation of `active`
//!
//! Every mutator builds its new contents before committing, so an error
//! leaves all views untouched.

use tracing::debug;

use crate::traits::SurfaceAccess;
use crate::types::{try_alloc, OverlayError, Result, ValueRange};

#[derive(Debug, Clone, Default)]
pub struct ScalarBuffer {
    raw: Vec<f32>,
    active: Vec<f32>,
    unsmoothed: Vec<f32>,
    vertex_count: usize,
    frame_count: usize,
    active_frame: usize,
    range: ValueRange,
}

impl ScalarBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-frame buffer seeded from the surface's per-vertex scalars
    pub fn initialize(&mut self, surface: &dyn SurfaceAccess) -> Result<()> {
        let n = surface.vertex_count();
        let mut values = try_alloc(n)?;
        for (vertex, value) in values.iter_mut().enumerate() {
            *value = surface.vertex_value(vertex);
        }
        let raw = values.clone();
        let unsmoothed = values.clone();
        self.install(raw, values, unsmoothed, n, 1);
        debug!(target: "surface-overlay-engine", "Initialized single-frame buffer with {} vertices", n);
        Ok(())
    }

    /// Take ownership of a vertex × frame buffer of length `vertex_count * frame_count`
    ///
    /// `raw` is moved in; the caller keeps no access to it. Frame 0 becomes active.
    pub fn initialize_multi_frame(
        &mut self,
        raw: Vec<f32>,
        vertex_count: usize,
        frame_count: usize,
    ) -> Result<()> {
        let expected = vertex_count.checked_mul(frame_count);
        if frame_count == 0 || expected != Some(raw.len()) {
            return Err(OverlayError::BufferSizeMismatch {
                vertices: vertex_count,
                frames: frame_count,
                actual: raw.len(),
            });
        }
        let mut active = try_alloc(vertex_count)?;
        let mut unsmoothed = try_alloc(vertex_count)?;
        active.copy_from_slice(&raw[..vertex_count]);
        unsmoothed.copy_from_slice(&raw[..vertex_count]);
        self.install(raw, active, unsmoothed, vertex_count, frame_count);
        debug!(
            target: "surface-overlay-engine",
            "Initialized buffer with {} vertices x {} frames", vertex_count, frame_count
        );
        Ok(())
    }

    fn install(
        &mut self,
        raw: Vec<f32>,
        active: Vec<f32>,
        unsmoothed: Vec<f32>,
        vertex_count: usize,
        frame_count: usize,
    ) {
        self.range = ValueRange::of(&active).unwrap_or_default();
        self.raw = raw;
        self.active = active;
        self.unsmoothed = unsmoothed;
        self.vertex_count = vertex_count;
        self.frame_count = frame_count;
        self.active_frame = 0;
    }

    /// True once either initializer succeeded
    pub fn is_initialized(&self) -> bool {
        self.frame_count > 0 && self.active.len() == self.vertex_count
    }

    /// Make `frame` the displayed frame; out-of-range frames wrap to 0
    ///
    /// Returns the frame actually selected.
    pub fn set_active_frame(&mut self, frame: usize) -> usize {
        let frame = if frame >= self.frame_count { 0 } else { frame };
        self.active_frame = frame;
        let n = self.vertex_count;
        if let Some(slice) = self.raw.get(frame * n..frame * n + n) {
            self.active.copy_from_slice(slice);
            self.unsmoothed.copy_from_slice(slice);
        }
        self.refresh_range();
        frame
    }

    pub fn active_frame(&self) -> usize {
        self.active_frame
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn value_at(&self, vertex: usize) -> Option<f32> {
        self.active.get(vertex).copied()
    }

    /// Bounds of the active values
    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn raw(&self) -> &[f32] {
        &self.raw
    }

    pub fn active(&self) -> &[f32] {
        &self.active
    }

    pub fn unsmoothed(&self) -> &[f32] {
        &self.unsmoothed
    }

    /// Values of one frame without changing the active frame
    pub fn frame(&self, frame: usize) -> Option<&[f32]> {
        if frame >= self.frame_count {
            return None;
        }
        let n = self.vertex_count;
        self.raw.get(frame * n..frame * n + n)
    }

    pub fn frame_range(&self, frame: usize) -> Option<ValueRange> {
        self.frame(frame).and_then(ValueRange::of)
    }

    /// Gather the `F`-length series of `vertex` (strided over frames) into `out`
    pub fn vertex_series_into(&self, vertex: usize, out: &mut [f32]) {
        let n = self.vertex_count;
        for (frame, value) in out.iter_mut().enumerate().take(self.frame_count) {
            *value = self.raw[vertex + frame * n];
        }
    }

    /// Install a freshly computed field as both active and unsmoothed values
    pub fn commit_computed(&mut self, values: Vec<f32>) -> Result<()> {
        self.check_len(values.len())?;
        self.unsmoothed.copy_from_slice(&values);
        self.active = values;
        self.refresh_range();
        Ok(())
    }

    /// Like [`Self::commit_computed`], also overwriting the first `N` raw values
    pub fn commit_correlation_slice(&mut self, values: Vec<f32>) -> Result<()> {
        self.check_len(values.len())?;
        self.raw[..self.vertex_count].copy_from_slice(&values);
        self.commit_computed(values)
    }

    /// Replace only the displayed values (smoothing output)
    pub fn replace_active(&mut self, values: Vec<f32>) -> Result<()> {
        self.check_len(values.len())?;
        self.active = values;
        self.refresh_range();
        Ok(())
    }

    /// `active := unsmoothed`, verbatim
    pub fn restore_unsmoothed(&mut self) {
        self.active.copy_from_slice(&self.unsmoothed);
        self.refresh_range();
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if !self.is_initialized() {
            return Err(OverlayError::NotInitialized);
        }
        if len != self.vertex_count {
            return Err(OverlayError::VertexCountMismatch {
                expected: self.vertex_count,
                actual: len,
            });
        }
        Ok(())
    }

    fn refresh_range(&mut self) {
        self.range = ValueRange::of(&self.active).unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_buffer() -> ScalarBuffer {
        let mut buffer = ScalarBuffer::new();
        buffer
            .initialize_multi_frame(vec![1.0, 2.0, 3.0, 4.0, 10.0, 20.0, 30.0, 40.0], 4, 2)
            .unwrap();
        buffer
    }

    #[test]
    fn test_initial_frame_is_zero() {
        let buffer = scenario_buffer();
        assert_eq!(buffer.active(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(buffer.unsmoothed(), buffer.active());
        assert_eq!(buffer.range(), ValueRange::new(1.0, 4.0));
    }

    #[test]
    fn test_set_active_frame_scenario() {
        let mut buffer = scenario_buffer();
        assert_eq!(buffer.set_active_frame(1), 1);
        assert_eq!(buffer.active(), &[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(buffer.range(), ValueRange::new(10.0, 40.0));

        assert_eq!(buffer.set_active_frame(5), 0);
        assert_eq!(buffer.active(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(buffer.active_frame(), 0);
    }

    #[test]
    fn test_out_of_range_frame_matches_frame_zero() {
        let mut a = scenario_buffer();
        let mut b = scenario_buffer();
        a.set_active_frame(2);
        b.set_active_frame(0);
        assert_eq!(a.active(), b.active());
        assert_eq!(a.range(), b.range());
    }

    #[test]
    fn test_frame_selection_is_idempotent() {
        let mut buffer = scenario_buffer();
        buffer.set_active_frame(1);
        let first = buffer.active().to_vec();
        buffer.set_active_frame(buffer.active_frame());
        assert_eq!(buffer.active(), first.as_slice());
    }

    #[test]
    fn test_buffer_size_mismatch_leaves_state() {
        let mut buffer = scenario_buffer();
        let err = buffer.initialize_multi_frame(vec![0.0; 7], 4, 2).unwrap_err();
        assert!(matches!(err, OverlayError::BufferSizeMismatch { actual: 7, .. }));
        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.active(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_vertex_series_is_strided() {
        let buffer = scenario_buffer();
        let mut series = [0.0; 2];
        buffer.vertex_series_into(2, &mut series);
        assert_eq!(series, [3.0, 30.0]);
    }

    #[test]
    fn test_frame_range_does_not_change_active() {
        let buffer = scenario_buffer();
        assert_eq!(buffer.frame_range(1), Some(ValueRange::new(10.0, 40.0)));
        assert_eq!(buffer.frame_range(2), None);
        assert_eq!(buffer.active_frame(), 0);
    }

    #[test]
    fn test_commit_correlation_slice() {
        let mut buffer = scenario_buffer();
        buffer.commit_correlation_slice(vec![0.5, -0.5, 0.25, 1.0]).unwrap();
        assert_eq!(&buffer.raw()[..4], &[0.5, -0.5, 0.25, 1.0]);
        assert_eq!(buffer.unsmoothed(), buffer.active());
        assert_eq!(buffer.range(), ValueRange::new(-0.5, 1.0));

        assert!(buffer.commit_computed(vec![0.0; 3]).is_err());
        assert_eq!(buffer.active(), &[0.5, -0.5, 0.25, 1.0]);
    }

    #[test]
    fn test_restore_unsmoothed_is_exact() {
        let mut buffer = scenario_buffer();
        buffer.replace_active(vec![9.0, 9.0, 9.0, 9.0]).unwrap();
        assert_eq!(buffer.range(), ValueRange::new(9.0, 9.0));
        buffer.restore_unsmoothed();
        assert_eq!(buffer.active(), buffer.unsmoothed());
        assert_eq!(buffer.range(), ValueRange::new(1.0, 4.0));
    }

    #[test]
    fn test_uninitialized_rejects_commits() {
        let mut buffer = ScalarBuffer::new();
        assert!(!buffer.is_initialized());
        assert_eq!(buffer.commit_computed(vec![]).unwrap_err(), OverlayError::NotInitialized);
    }
}
