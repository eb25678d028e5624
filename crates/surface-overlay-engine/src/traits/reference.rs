// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// A displayed 4D volume whose voxel time series drives live correlation maps
///
/// Coordinates flow display (target) space → RAS → the volume's original
/// voxel index space.
pub trait ReferenceVolume: Send + Sync {
    fn frame_count(&self) -> usize;

    /// Current slice cursor in display space
    fn slice_position(&self) -> [f64; 3];

    fn target_to_ras(&self, position: [f64; 3]) -> [f64; 3];

    fn ras_to_original_index(&self, ras: [f64; 3]) -> [i64; 3];

    /// Copy every frame of voxel `index` into `out` (`out.len() == frame_count()`).
    /// Returns false when the index lies outside the volume.
    fn voxel_values_all_frames(&self, index: [i64; 3], out: &mut [f32]) -> bool;
}
