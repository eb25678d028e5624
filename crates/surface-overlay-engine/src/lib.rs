// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Surface Overlay Engine
//!
//! Per-vertex scalar overlay data for anatomical surface meshes:
//! - **ScalarBuffer**: raw multi-frame storage plus the active, unsmoothed and range views
//! - **Correlation**: seeded lookups into a preloaded all-pairs correlation volume, and
//!   live Pearson maps against a reference volume's time series
//! - **Smoothing**: iterative neighbour averaging over the mesh adjacency
//! - **PairLink**: left/right hemisphere overlays sharing one correlation volume
//!
//! Rendering, palettes and file formats are collaborators reached through the
//! traits in [`traits`]; in-memory implementations live in [`memory`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use surface_overlay_engine::memory::InMemorySurface;
//! use surface_overlay_engine::{Hemisphere, MeshAdjacency, SurfaceOverlay};
//!
//! let adjacency = MeshAdjacency::from_neighbor_lists(&[vec![1], vec![0, 2], vec![1]]);
//! let surface = Arc::new(InMemorySurface::new(vec![1.0, 2.0, 3.0], adjacency, Hemisphere::Left));
//! let mut overlay = SurfaceOverlay::with_defaults("thickness", surface)?;
//!
//! overlay.initialize_multi_frame(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2)?;
//! overlay.set_active_frame(1);
//! assert_eq!(overlay.data_at_vertex(0), Some(4.0));
//! # Ok::<(), surface_overlay_engine::OverlayError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod correlation;
pub mod memory;
pub mod overlay;
pub mod pair_link;
pub mod scalar_buffer;
pub mod smoothing;
pub mod traits;
pub mod types;

pub use correlation::pearson_correlation;
pub use overlay::{Notify, OverlayHandle, SurfaceOverlay};
pub use pair_link::{pair_overlays, PairLink};
pub use scalar_buffer::ScalarBuffer;
pub use smoothing::SmoothingStage;
pub use traits::{
    BasicOverlayProperty, OverlayObserver, OverlayProperty, ProgressSink, ReferenceVolume,
    SharedProperty, SurfaceAccess, TracingProgress, VolumeReader,
};
pub use types::{
    CorrelationLayout, CorrelationVolume, Hemisphere, HemisphereSelector, MeshAdjacency, OverlayError, Result,
    ValueRange, VolumeHeader,
};
