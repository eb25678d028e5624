// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Collaborator traits
//!
//! The overlay engine owns no geometry, rendering, palette or file format
//! code. Everything it consumes from the outside is reached through these
//! traits:
//! - [`SurfaceAccess`]: vertex values, adjacency, hemisphere, refresh requests
//! - [`VolumeReader`] + [`ProgressSink`]: correlation volume loading
//! - [`ReferenceVolume`]: live time series for correlation maps
//! - [`OverlayProperty`]: smoothing settings and color mapping
//! - [`OverlayObserver`]: "data updated" notifications

pub mod observer;
pub mod property;
pub mod reference;
pub mod surface;
pub mod volume_reader;

pub use observer::OverlayObserver;
pub use property::{BasicOverlayProperty, OverlayProperty, SharedProperty};
pub use reference::ReferenceVolume;
pub use surface::SurfaceAccess;
pub use volume_reader::{ProgressSink, ThrottledProgress, TracingProgress, VolumeReader};
