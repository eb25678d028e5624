// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Seeded correlation from a preloaded all-pairs volume
//!
//! Exactly one overlay of a pair owns the volume ([`VolumeSlot::Owned`]);
//! its partner reads through a [`VolumeSlot::Borrowed`] handle. Loads and
//! replacements go through the owner. The borrowed handle keeps the data
//! alive, so a partner dropped without handing over ownership never
//! leaves the survivor without a volume.

use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::traits::{ProgressSink, ThrottledProgress, VolumeReader};
use crate::types::{CorrelationLayout, CorrelationVolume, OverlayError, Result};

/// Where an overlay's correlation volume lives
#[derive(Debug, Clone, Default)]
pub enum VolumeSlot {
    #[default]
    Empty,
    Owned(Arc<CorrelationVolume>),
    /// The partner's volume, read-only from this side
    Borrowed(Arc<CorrelationVolume>),
}

impl VolumeSlot {
    pub fn get(&self) -> Option<Arc<CorrelationVolume>> {
        match self {
            VolumeSlot::Empty => None,
            VolumeSlot::Owned(volume) | VolumeSlot::Borrowed(volume) => Some(Arc::clone(volume)),
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, VolumeSlot::Owned(_))
    }

    /// A non-owning slot pointing at the same volume
    pub fn borrowed(&self) -> VolumeSlot {
        match self {
            VolumeSlot::Empty => VolumeSlot::Empty,
            VolumeSlot::Owned(volume) | VolumeSlot::Borrowed(volume) => VolumeSlot::Borrowed(Arc::clone(volume)),
        }
    }
}

/// Seeded-volume correlation state of one overlay
#[derive(Debug, Clone, Default)]
pub struct SeededCorrelation {
    pub(crate) volume: VolumeSlot,
    layout: Option<CorrelationLayout>,
    ready: bool,
}

impl SeededCorrelation {
    /// True once a volume has been loaded or shared with this overlay
    pub fn has_data(&self) -> bool {
        self.layout.is_some()
    }

    /// True once a vertex has been queried against the current volume
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn layout(&self) -> Option<CorrelationLayout> {
        self.layout
    }

    pub fn is_owner(&self) -> bool {
        self.volume.is_owner()
    }

    pub(crate) fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Volume and layout for a query
    pub fn current(&self) -> Result<(Arc<CorrelationVolume>, CorrelationLayout)> {
        let layout = self.layout.ok_or(OverlayError::NoCorrelationVolume)?;
        let volume = self.volume.get().ok_or(OverlayError::NoCorrelationVolume)?;
        Ok((volume, layout))
    }

    /// Replace the volume slot; the state becomes unready until the next query
    pub(crate) fn install(&mut self, volume: VolumeSlot, layout: CorrelationLayout) {
        self.volume = volume;
        self.layout = Some(layout);
        self.ready = false;
    }

    /// Turn a borrowed slot into an owned one (partner is going away)
    pub(crate) fn adopt(&mut self, volume: Arc<CorrelationVolume>) {
        self.volume = VolumeSlot::Owned(volume);
    }

    /// Validate the header, then perform the full read
    ///
    /// Nothing is installed here; on any error the caller's state is untouched.
    pub fn load(
        reader: &dyn VolumeReader,
        path: &Path,
        vertex_count: usize,
        progress: &mut dyn ProgressSink,
        progress_interval: u8,
    ) -> Result<(Arc<CorrelationVolume>, CorrelationLayout)> {
        let header = reader.read_header(path).map_err(|e| {
            error!(target: "surface-overlay-engine", "Header read failed for {}: {}", path.display(), e);
            e
        })?;

        let layout = header.layout_for(vertex_count).map_err(|e| {
            error!(target: "surface-overlay-engine", "{}", e);
            e
        })?;

        let mut throttled = ThrottledProgress::new(progress, progress_interval);
        let volume = reader.read_volume(path, &mut throttled).map_err(|e| {
            error!(target: "surface-overlay-engine", "Volume read failed for {}: {}", path.display(), e);
            e
        })?;

        let loaded = volume.header();
        if loaded != header {
            error!(
                target: "surface-overlay-engine",
                "Volume {} changed shape between header probe and full read", path.display()
            );
            return Err(OverlayError::ShapeMismatch {
                expected: vertex_count * 2,
                width: loaded.width,
                height: loaded.height,
                frames: loaded.frames,
            });
        }

        info!(
            target: "surface-overlay-engine",
            "Loaded correlation volume {} ({}x{}x{}x{}, {:?})",
            path.display(),
            loaded.width,
            loaded.height,
            loaded.depth,
            loaded.frames,
            layout
        );
        Ok((Arc::new(volume), layout))
    }
}
