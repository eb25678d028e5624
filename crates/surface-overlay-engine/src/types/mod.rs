// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Overlay Types
//!
//! Core type definitions shared by the buffer, correlation and pairing modules.

pub mod error;
pub mod hemisphere;
pub mod mesh;
pub mod range;
pub mod volume;

pub use error::{OverlayError, Result};
pub use hemisphere::{Hemisphere, HemisphereSelector};
pub use mesh::MeshAdjacency;
pub use range::ValueRange;
pub use volume::{CorrelationLayout, CorrelationVolume, VolumeHeader};

/// Allocate a zeroed scalar field, reporting allocation failure instead of aborting
pub(crate) fn try_alloc(len: usize) -> Result<Vec<f32>> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| OverlayError::AllocationFailure { requested: len })?;
    values.resize(len, 0.0);
    Ok(values)
}
