// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use ndarray::Array4;
use parking_lot::RwLock;

use crate::traits::ReferenceVolume;

/// 4D reference volume (`[x, y, z, frame]`) with identity coordinate transforms
///
/// Display, RAS and index space coincide; RAS coordinates round to the
/// nearest voxel.
#[derive(Debug)]
pub struct InMemoryReferenceVolume {
    data: Array4<f32>,
    slice_position: RwLock<[f64; 3]>,
}

impl InMemoryReferenceVolume {
    pub fn new(data: Array4<f32>) -> Self {
        Self {
            data,
            slice_position: RwLock::new([0.0; 3]),
        }
    }

    /// Move the slice cursor (display space)
    pub fn set_slice_position(&self, position: [f64; 3]) {
        *self.slice_position.write() = position;
    }

    pub fn data(&self) -> &Array4<f32> {
        &self.data
    }
}

impl ReferenceVolume for InMemoryReferenceVolume {
    fn frame_count(&self) -> usize {
        self.data.dim().3
    }

    fn slice_position(&self) -> [f64; 3] {
        *self.slice_position.read()
    }

    fn target_to_ras(&self, position: [f64; 3]) -> [f64; 3] {
        position
    }

    fn ras_to_original_index(&self, ras: [f64; 3]) -> [i64; 3] {
        ras.map(|c| c.round() as i64)
    }

    fn voxel_values_all_frames(&self, index: [i64; 3], out: &mut [f32]) -> bool {
        let (width, height, depth, frames) = self.data.dim();
        let [x, y, z] = index;
        let inside = |c: i64, len: usize| c >= 0 && (c as usize) < len;
        if !inside(x, width) || !inside(y, height) || !inside(z, depth) || out.len() != frames {
            return false;
        }
        let series = self.data.slice(ndarray::s![x as usize, y as usize, z as usize, ..]);
        for (dst, &src) in out.iter_mut().zip(series.iter()) {
            *dst = src;
        }
        true
    }
}
