// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Surface Overlay
//!
//! One overlay drawn on one surface: the scalar buffer, both correlation
//! modes, smoothing and the optional hemisphere partner.
//!
//! ## Notifications
//!
//! Mutations that change the displayed values ask the surface to refresh
//! and notify subscribed [`OverlayObserver`]s. Updates forwarded to a
//! partner run with [`Notify::Suppressed`] so the partner updates its state
//! without emitting a second notification and without forwarding back.

use parking_lot::RwLock;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use surface_overlay_config::OverlayConfig;
use tracing::{debug, error, info, warn};

use crate::correlation::{LiveCorrelation, SeededCorrelation, VolumeSlot};
use crate::pair_link::{self, PairLink};
use crate::scalar_buffer::ScalarBuffer;
use crate::smoothing::SmoothingStage;
use crate::traits::{
    BasicOverlayProperty, OverlayObserver, ProgressSink, ReferenceVolume, SharedProperty, SurfaceAccess,
    VolumeReader,
};
use crate::types::{
    try_alloc, Hemisphere, HemisphereSelector, OverlayError, Result, ValueRange,
};

/// Shared handle used for pairing; partners refer to each other weakly
pub type OverlayHandle = Arc<RwLock<SurfaceOverlay>>;

/// Whether an update notifies observers and forwards to the partner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notify {
    Emit,
    Suppressed,
}

pub struct SurfaceOverlay {
    name: String,
    surface: Arc<dyn SurfaceAccess>,
    pub(crate) property: SharedProperty,
    buffer: ScalarBuffer,
    pub(crate) seeded: SeededCorrelation,
    live: LiveCorrelation,
    smoother: SmoothingStage,
    pub(crate) pair: Option<PairLink>,
    observers: Vec<Arc<dyn OverlayObserver>>,
    progress_interval: u8,
}

impl SurfaceOverlay {
    /// Create an overlay seeded with the surface's per-vertex values
    pub fn new(
        name: impl Into<String>,
        surface: Arc<dyn SurfaceAccess>,
        property: SharedProperty,
        config: &OverlayConfig,
    ) -> Result<Self> {
        let name = name.into();
        let mut buffer = ScalarBuffer::new();
        buffer.initialize(surface.as_ref()).map_err(|e| {
            error!(target: "surface-overlay-engine", "Failed to initialize overlay '{}': {}", name, e);
            e
        })?;

        let mut live = LiveCorrelation::new(config.correlation.degenerate_coefficient);
        live.allocate(buffer.frame_count())?;

        debug!(
            target: "surface-overlay-engine",
            "Created overlay '{}' on {} surface ({} vertices)",
            name,
            surface.hemisphere(),
            buffer.vertex_count()
        );

        Ok(Self {
            name,
            surface,
            property,
            buffer,
            seeded: SeededCorrelation::default(),
            live,
            smoother: SmoothingStage::from_config(&config.smoothing),
            pair: None,
            observers: Vec::new(),
            progress_interval: config.correlation.progress_interval_percent,
        })
    }

    /// Overlay with its own [`BasicOverlayProperty`] built from `config`
    pub fn with_config(
        name: impl Into<String>,
        surface: Arc<dyn SurfaceAccess>,
        config: &OverlayConfig,
    ) -> Result<Self> {
        let property = BasicOverlayProperty::from_config(&config.smoothing).into_shared();
        Self::new(name, surface, property, config)
    }

    pub fn with_defaults(name: impl Into<String>, surface: Arc<dyn SurfaceAccess>) -> Result<Self> {
        Self::with_config(name, surface, &OverlayConfig::default())
    }

    pub fn into_handle(self) -> OverlayHandle {
        Arc::new(RwLock::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn surface(&self) -> &Arc<dyn SurfaceAccess> {
        &self.surface
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.surface.hemisphere()
    }

    /// The property object (shared with the partner once paired)
    pub fn property(&self) -> SharedProperty {
        Arc::clone(&self.property)
    }

    pub fn vertex_count(&self) -> usize {
        self.buffer.vertex_count()
    }

    pub fn data_at_vertex(&self, vertex: usize) -> Option<f32> {
        self.buffer.value_at(vertex)
    }

    /// Currently displayed values
    pub fn active_values(&self) -> &[f32] {
        self.buffer.active()
    }

    pub fn unsmoothed_values(&self) -> &[f32] {
        self.buffer.unsmoothed()
    }

    /// Data bounds, or exactly `[-1, 1]` while computing live correlation
    pub fn range(&self) -> ValueRange {
        if self.live.is_enabled() {
            ValueRange::CORRELATION
        } else {
            self.buffer.range()
        }
    }

    /// Map the displayed values into `colors` (RGBA per vertex)
    ///
    /// Returns false without touching `colors` while loaded correlation data
    /// has not been queried yet.
    pub fn map_overlay(&self, colors: &mut [u8]) -> bool {
        if self.seeded.has_data() && !self.seeded.is_ready() {
            return false;
        }
        self.property.read().map_overlay_color(self.buffer.active(), colors);
        true
    }

    // ═══════════════════════════════════════════════════════════
    // Frames
    // ═══════════════════════════════════════════════════════════

    /// Take ownership of a vertex × frame matrix (`raw[frame * N + vertex]`)
    ///
    /// Frame 0 becomes active and the property's display defaults are reset.
    pub fn initialize_multi_frame(
        &mut self,
        data: Vec<f32>,
        vertex_count: usize,
        frame_count: usize,
    ) -> Result<()> {
        if vertex_count != self.surface.vertex_count() {
            return Err(OverlayError::VertexCountMismatch {
                expected: self.surface.vertex_count(),
                actual: vertex_count,
            });
        }

        let mut buffer = ScalarBuffer::new();
        buffer.initialize_multi_frame(data, vertex_count, frame_count)?;
        self.live.allocate(frame_count)?;
        self.buffer = buffer;

        self.set_active_frame(0);
        let range = self.buffer.range();
        self.property.write().reset(range);

        info!(
            target: "surface-overlay-engine",
            "Overlay '{}' holds {} frames of {} vertices", self.name, frame_count, vertex_count
        );
        Ok(())
    }

    /// Display `frame`; frames past the end select frame 0
    ///
    /// Returns the frame actually selected.
    pub fn set_active_frame(&mut self, frame: usize) -> usize {
        let selected = self.buffer.set_active_frame(frame);
        if selected != frame {
            debug!(
                target: "surface-overlay-engine",
                "Frame {} out of range for '{}' ({} frames), showing frame 0",
                frame,
                self.name,
                self.buffer.frame_count()
            );
        }
        if self.smooth_enabled() {
            self.apply_smoothing();
        }
        selected
    }

    pub fn active_frame(&self) -> usize {
        self.buffer.active_frame()
    }

    pub fn frame_count(&self) -> usize {
        self.buffer.frame_count()
    }

    /// Value range of any frame without changing the displayed one
    pub fn frame_range(&self, frame: usize) -> Option<ValueRange> {
        self.buffer.frame_range(frame)
    }

    // ═══════════════════════════════════════════════════════════
    // Seeded correlation
    // ═══════════════════════════════════════════════════════════

    /// Load an all-pairs correlation volume, replacing any previous one
    ///
    /// This overlay becomes the owner; a partner is re-pointed at the new
    /// volume. On failure nothing changes.
    pub fn load_correlation_data(
        &mut self,
        path: &Path,
        reader: &dyn VolumeReader,
        progress: &mut dyn ProgressSink,
    ) -> Result<()> {
        let (volume, layout) =
            SeededCorrelation::load(reader, path, self.vertex_count(), progress, self.progress_interval)?;

        if let Some(partner) = self.partner() {
            partner
                .write()
                .seeded
                .install(VolumeSlot::Borrowed(Arc::clone(&volume)), layout);
        }
        self.seeded.install(VolumeSlot::Owned(volume), layout);
        Ok(())
    }

    pub fn has_correlation_data(&self) -> bool {
        self.seeded.has_data()
    }

    pub fn is_correlation_ready(&self) -> bool {
        self.seeded.is_ready()
    }

    /// True when this overlay (not its partner) owns the correlation volume
    ///
    /// An unpaired overlay holding data is its only holder and owns it, even
    /// if the former owner went away without handing it over.
    pub fn owns_correlation_volume(&self) -> bool {
        self.seeded.is_owner() || (self.seeded.has_data() && !self.is_paired())
    }

    /// Display the correlations of seed `vertex` of `hemisphere` with every
    /// vertex of this overlay's hemisphere
    pub fn update_correlation_at_vertex(
        &mut self,
        vertex: usize,
        hemisphere: HemisphereSelector,
    ) -> Result<()> {
        self.correlation_at_vertex(vertex, hemisphere, Notify::Emit)
    }

    pub(crate) fn correlation_at_vertex(
        &mut self,
        vertex: usize,
        selector: HemisphereSelector,
        notify: Notify,
    ) -> Result<()> {
        let n = self.vertex_count();
        if vertex >= n {
            return Err(OverlayError::VertexOutOfRange {
                vertex,
                vertex_count: n,
            });
        }
        let own = self.hemisphere();
        let hemisphere = selector.resolve(own);
        let (volume, layout) = self.seeded.current()?;

        let mut values = try_alloc(n)?;
        volume.seed_row_into(layout, vertex + hemisphere.index() * n, own.index() * n, &mut values)?;

        let old_range = self.buffer.range();
        self.buffer.commit_correlation_slice(values)?;
        if self.smooth_enabled() {
            self.apply_smoothing();
        }
        self.seeded.mark_ready();

        if old_range.is_degenerate() {
            let range = self.range();
            self.property.write().reset(range);
        }

        if notify == Notify::Emit && hemisphere == own {
            if let Some(partner) = self.partner() {
                let result = partner.write().correlation_at_vertex(
                    vertex,
                    HemisphereSelector::Explicit(hemisphere),
                    Notify::Suppressed,
                );
                if let Err(e) = result {
                    warn!(target: "surface-overlay-engine", "Partner of '{}' did not follow seed {}: {}", self.name, vertex, e);
                }
            }
        }

        self.surface.request_overlay_refresh();
        if notify == Notify::Emit {
            self.emit_data_updated();
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Live correlation
    // ═══════════════════════════════════════════════════════════

    /// Switch live correlation on (recomputing) or off (restoring the frame)
    ///
    /// If the first recompute fails, compute mode stays off.
    pub fn set_compute_correlation(&mut self, enabled: bool) -> Result<()> {
        self.live.set_enabled(enabled);
        if enabled {
            if let Err(e) = self.update_correlation_coefficient() {
                self.live.set_enabled(false);
                return Err(e);
            }
        } else {
            let frame = self.buffer.active_frame();
            self.set_active_frame(frame);
        }
        Ok(())
    }

    pub fn is_compute_correlation(&self) -> bool {
        self.live.is_enabled()
    }

    /// Replace the reference volume and recompute
    ///
    /// Only a weak reference is kept.
    pub fn set_correlation_source(&mut self, source: &Arc<dyn ReferenceVolume>) -> Result<bool> {
        self.live.set_source(source);
        self.update_correlation_coefficient()
    }

    pub fn clear_correlation_source(&mut self) {
        self.live.clear_source();
    }

    pub fn has_correlation_source(&self) -> bool {
        self.live.has_source()
    }

    /// Recompute the live correlation map
    ///
    /// Returns `Ok(false)` when nothing was computed: live mode off, no
    /// (or a dropped) reference volume, or frame counts that differ.
    pub fn update_correlation_coefficient(&mut self) -> Result<bool> {
        if !self.live.is_enabled() {
            return Ok(false);
        }
        let computed = self
            .live
            .compute(self.buffer.raw(), self.buffer.vertex_count(), self.buffer.frame_count())?;
        let Some(coefficients) = computed else {
            return Ok(false);
        };

        self.buffer.commit_computed(coefficients)?;
        if self.smooth_enabled() {
            self.apply_smoothing();
        }
        self.surface.request_overlay_refresh();
        self.emit_data_updated();
        Ok(true)
    }

    // ═══════════════════════════════════════════════════════════
    // Smoothing
    // ═══════════════════════════════════════════════════════════

    pub fn smooth_enabled(&self) -> bool {
        self.property.read().smooth_enabled()
    }

    /// Smooth the unsmoothed values
    ///
    /// `steps < 1` uses the property's step count. With `out` the result is
    /// written there and the overlay is untouched; otherwise it becomes the
    /// displayed data.
    pub fn smooth_data(&mut self, steps: u32, out: Option<&mut [f32]>) -> Result<()> {
        let property_steps = self.property.read().smooth_steps();
        let steps = self.smoother.resolve_steps(steps, property_steps);

        let smoothed = self
            .smoother
            .smooth(self.surface.adjacency(), self.buffer.unsmoothed(), steps)
            .map_err(|e| {
                error!(target: "surface-overlay-engine", "Smoothing '{}' failed: {}", self.name, e);
                e
            })?;

        match out {
            Some(out) => {
                if out.len() != smoothed.len() {
                    return Err(OverlayError::VertexCountMismatch {
                        expected: smoothed.len(),
                        actual: out.len(),
                    });
                }
                out.copy_from_slice(&smoothed);
                Ok(())
            }
            None => self.buffer.replace_active(smoothed),
        }
    }

    fn apply_smoothing(&mut self) {
        // Failure is logged by smooth_data; the displayed values stay as they were
        let _ = self.smooth_data(0, None);
    }

    /// Re-apply the property's smoothing flag, optionally on the partner too
    pub fn update_smooth(&mut self, propagate: bool) {
        if self.smooth_enabled() {
            self.apply_smoothing();
        } else {
            self.buffer.restore_unsmoothed();
        }
        self.surface.request_overlay_refresh();
        self.emit_data_updated();

        if propagate {
            if let Some(partner) = self.partner() {
                partner.write().update_smooth(false);
            }
        }
    }

    /// Toggle smoothing on the property and apply it to both partners
    pub fn set_smooth(&mut self, enabled: bool) {
        self.property.write().set_smooth_enabled(enabled);
        self.update_smooth(true);
    }

    // ═══════════════════════════════════════════════════════════
    // Pairing and notifications
    // ═══════════════════════════════════════════════════════════

    pub fn is_paired(&self) -> bool {
        self.partner().is_some()
    }

    pub fn partner(&self) -> Option<OverlayHandle> {
        self.pair.as_ref().and_then(PairLink::partner)
    }

    pub fn subscribe(&mut self, observer: Arc<dyn OverlayObserver>) {
        self.observers.push(observer);
    }

    fn emit_data_updated(&self) {
        for observer in &self.observers {
            observer.data_updated(&self.name);
        }
    }
}

impl fmt::Debug for SurfaceOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceOverlay")
            .field("name", &self.name)
            .field("hemisphere", &self.surface.hemisphere())
            .field("vertex_count", &self.buffer.vertex_count())
            .field("frame_count", &self.buffer.frame_count())
            .field("active_frame", &self.buffer.active_frame())
            .field("correlation_data", &self.seeded.has_data())
            .field("compute_correlation", &self.live.is_enabled())
            .field("paired", &self.pair.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for SurfaceOverlay {
    fn drop(&mut self) {
        pair_link::unlink(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySurface;
    use crate::types::MeshAdjacency;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver(AtomicUsize);

    impl OverlayObserver for CountingObserver {
        fn data_updated(&self, _overlay_name: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn path_surface(values: Vec<f32>) -> Arc<InMemorySurface> {
        let n = values.len();
        let lists: Vec<Vec<usize>> = (0..n)
            .map(|v| {
                let mut list = Vec::new();
                if v > 0 {
                    list.push(v - 1);
                }
                if v + 1 < n {
                    list.push(v + 1);
                }
                list
            })
            .collect();
        Arc::new(InMemorySurface::new(values, MeshAdjacency::from_neighbor_lists(&lists), Hemisphere::Left))
    }

    #[test]
    fn test_initial_values_come_from_surface() {
        let overlay = SurfaceOverlay::with_defaults("thickness", path_surface(vec![2.0, 1.0, 3.0])).unwrap();
        assert_eq!(overlay.active_values(), &[2.0, 1.0, 3.0]);
        assert_eq!(overlay.range(), ValueRange::new(1.0, 3.0));
        assert_eq!(overlay.frame_count(), 1);
        assert_eq!(overlay.name(), "thickness");
    }

    #[test]
    fn test_multi_frame_vertex_count_must_match_surface() {
        let mut overlay = SurfaceOverlay::with_defaults("sig", path_surface(vec![0.0; 3])).unwrap();
        let err = overlay.initialize_multi_frame(vec![0.0; 8], 4, 2).unwrap_err();
        assert_eq!(err, OverlayError::VertexCountMismatch { expected: 3, actual: 4 });
        assert_eq!(overlay.frame_count(), 1);
    }

    #[test]
    fn test_initialize_multi_frame_resets_property() {
        let mut overlay = SurfaceOverlay::with_defaults("sig", path_surface(vec![0.0; 2])).unwrap();
        overlay.initialize_multi_frame(vec![1.0, 3.0, 5.0, 7.0], 2, 2).unwrap();
        assert_eq!(overlay.active_values(), &[1.0, 3.0]);
        assert_eq!(overlay.frame_range(1), Some(ValueRange::new(5.0, 7.0)));
    }

    #[test]
    fn test_range_is_fixed_in_compute_mode() {
        let mut overlay = SurfaceOverlay::with_defaults("sig", path_surface(vec![10.0, 20.0])).unwrap();
        overlay.set_compute_correlation(true).unwrap();
        assert_eq!(overlay.range(), ValueRange::CORRELATION);
        overlay.set_compute_correlation(false).unwrap();
        assert_eq!(overlay.range(), ValueRange::new(10.0, 20.0));
    }

    #[test]
    fn test_failed_recompute_leaves_compute_mode_off() {
        let mut overlay = SurfaceOverlay::with_defaults("sig", path_surface(vec![0.0; 2])).unwrap();
        overlay.initialize_multi_frame(vec![1.0, 4.0, 2.0, 3.0], 2, 2).unwrap();
        let data = ndarray::Array4::from_shape_vec((1, 1, 1, 2), vec![1.0, 2.0]).unwrap();
        let source: Arc<dyn ReferenceVolume> = Arc::new(crate::memory::InMemoryReferenceVolume::new(data));
        assert!(!overlay.set_correlation_source(&source).unwrap());

        // Scratch sized for the wrong frame count makes the recompute fail
        overlay.live.allocate(3).unwrap();
        let err = overlay.set_compute_correlation(true).unwrap_err();

        assert_eq!(err, OverlayError::FrameCountMismatch { expected: 2, actual: 3 });
        assert!(!overlay.is_compute_correlation());
        assert_eq!(overlay.range(), ValueRange::new(1.0, 4.0));
        assert_eq!(overlay.active_values(), &[1.0, 4.0]);
    }

    #[test]
    fn test_smoothing_with_dangling_neighbor() {
        let adjacency = MeshAdjacency::from_neighbor_lists(&[vec![1], vec![0, 5]]);
        let surface = Arc::new(InMemorySurface::new(vec![0.0, 4.0], adjacency, Hemisphere::Left));
        let mut overlay = SurfaceOverlay::with_defaults("sig", surface).unwrap();

        overlay.smooth_data(1, None).unwrap();
        assert_eq!(overlay.active_values(), &[2.0, 2.0]);
    }

    #[test]
    fn test_smoothing_toggle_restores_exactly() {
        let mut overlay = SurfaceOverlay::with_defaults("sig", path_surface(vec![0.1, 0.7, 0.3, 0.9])).unwrap();
        let observer = Arc::new(CountingObserver(AtomicUsize::new(0)));
        overlay.subscribe(observer.clone());

        overlay.set_smooth(true);
        assert_ne!(overlay.active_values(), overlay.unsmoothed_values());

        overlay.set_smooth(false);
        assert_eq!(overlay.active_values(), &[0.1, 0.7, 0.3, 0.9]);
        assert_eq!(observer.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_smooth_into_output_leaves_overlay() {
        let mut overlay = SurfaceOverlay::with_defaults("sig", path_surface(vec![0.0, 3.0, 6.0])).unwrap();
        let mut out = [0.0f32; 3];
        overlay.smooth_data(1, Some(&mut out)).unwrap();
        assert!((out[0] - 1.5).abs() < 1e-5);
        assert_eq!(overlay.active_values(), &[0.0, 3.0, 6.0]);

        let mut short = [0.0f32; 2];
        assert!(overlay.smooth_data(1, Some(&mut short)).is_err());
    }

    #[test]
    fn test_map_overlay_writes_colors() {
        let overlay = SurfaceOverlay::with_defaults("sig", path_surface(vec![0.0, 1.0])).unwrap();
        overlay.property().write().reset(ValueRange::new(0.0, 1.0));
        let mut colors = [0u8; 8];
        assert!(overlay.map_overlay(&mut colors));
        assert_eq!(&colors[4..8], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_query_without_volume_fails() {
        let mut overlay = SurfaceOverlay::with_defaults("sig", path_surface(vec![0.0; 2])).unwrap();
        assert_eq!(
            overlay.update_correlation_at_vertex(0, HemisphereSelector::Own).unwrap_err(),
            OverlayError::NoCorrelationVolume
        );
        assert!(matches!(
            overlay.update_correlation_at_vertex(5, HemisphereSelector::Own),
            Err(OverlayError::VertexOutOfRange { vertex: 5, .. })
        ));
    }
}
