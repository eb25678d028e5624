// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Correlation volume types
//!
//! A correlation volume is a 4D float dataset indexed `[x, y, z, frame]`
//! encoding the all-pairs correlation matrix of two concatenated
//! hemispheres (`2N` vertices). The seed vertex runs along `x`; the target
//! vertex runs along either `y` ([`CorrelationLayout::RowMajor`]) or the
//! frame axis ([`CorrelationLayout::FrameMajor`]).

use ndarray::{s, Array4};
use serde::{Deserialize, Serialize};

use super::error::{OverlayError, Result};

/// Axis carrying the target vertex of a correlation pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationLayout {
    /// Targets along the height axis (`height > 1`)
    RowMajor,
    /// Targets along the frame axis
    FrameMajor,
}

/// Dimensions of a volume as reported by a header-only probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeHeader {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub frames: usize,
}

impl VolumeHeader {
    pub fn new(width: usize, height: usize, depth: usize, frames: usize) -> Self {
        Self {
            width,
            height,
            depth,
            frames,
        }
    }

    pub fn voxel_count(&self) -> usize {
        self.width * self.height * self.depth * self.frames
    }

    /// Check that this volume encodes the correlation matrix of two
    /// hemispheres of `vertex_count` vertices each
    ///
    /// The width must be `2N` and one of height/frames must be `2N`; the
    /// other must be 1 or `2N`.
    pub fn layout_for(&self, vertex_count: usize) -> Result<CorrelationLayout> {
        let expected = vertex_count * 2;
        let mismatch = || OverlayError::ShapeMismatch {
            expected,
            width: self.width,
            height: self.height,
            frames: self.frames,
        };

        if expected == 0 || self.width != expected || self.depth == 0 {
            return Err(mismatch());
        }
        let height_ok = self.height == 1 || self.height == expected;
        let frames_ok = self.frames == 1 || self.frames == expected;
        if !height_ok || !frames_ok || (self.height != expected && self.frames != expected) {
            return Err(mismatch());
        }

        if self.height > 1 {
            Ok(CorrelationLayout::RowMajor)
        } else {
            Ok(CorrelationLayout::FrameMajor)
        }
    }
}

/// A fully loaded 4D correlation dataset
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationVolume {
    header: VolumeHeader,
    data: Array4<f32>,
}

impl CorrelationVolume {
    pub fn new(data: Array4<f32>) -> Self {
        let (width, height, depth, frames) = data.dim();
        Self {
            header: VolumeHeader::new(width, height, depth, frames),
            data,
        }
    }

    /// Build from a flat buffer in `[x, y, z, frame]` row-major order
    pub fn from_shape_vec(header: VolumeHeader, values: Vec<f32>) -> Result<Self> {
        let actual = values.len();
        let data = Array4::from_shape_vec(
            (header.width, header.height, header.depth, header.frames),
            values,
        )
        .map_err(|_| OverlayError::BufferSizeMismatch {
            vertices: header.width,
            frames: header.voxel_count() / header.width.max(1),
            actual,
        })?;
        Ok(Self { header, data })
    }

    pub fn header(&self) -> VolumeHeader {
        self.header
    }

    pub fn data(&self) -> &Array4<f32> {
        &self.data
    }

    pub fn value(&self, x: usize, y: usize, z: usize, frame: usize) -> Option<f32> {
        self.data.get([x, y, z, frame]).copied()
    }

    /// Copy the correlations of `seed` against targets
    /// `target_offset..target_offset + out.len()` into `out`
    pub fn seed_row_into(
        &self,
        layout: CorrelationLayout,
        seed: usize,
        target_offset: usize,
        out: &mut [f32],
    ) -> Result<()> {
        let targets = match layout {
            CorrelationLayout::RowMajor => self.header.height,
            CorrelationLayout::FrameMajor => self.header.frames,
        };
        if seed >= self.header.width {
            return Err(OverlayError::VertexOutOfRange {
                vertex: seed,
                vertex_count: self.header.width,
            });
        }
        let end = target_offset + out.len();
        if end > targets {
            return Err(OverlayError::VertexOutOfRange {
                vertex: end - 1,
                vertex_count: targets,
            });
        }

        let row = match layout {
            CorrelationLayout::RowMajor => self.data.slice(s![seed, target_offset..end, 0, 0]),
            CorrelationLayout::FrameMajor => self.data.slice(s![seed, 0, 0, target_offset..end]),
        };
        for (dst, &src) in out.iter_mut().zip(row.iter()) {
            *dst = src;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_row_major() {
        let header = VolumeHeader::new(8, 8, 1, 1);
        assert_eq!(header.layout_for(4).unwrap(), CorrelationLayout::RowMajor);
    }

    #[test]
    fn test_layout_frame_major() {
        let header = VolumeHeader::new(8, 1, 1, 8);
        assert_eq!(header.layout_for(4).unwrap(), CorrelationLayout::FrameMajor);
    }

    #[test]
    fn test_width_mismatch() {
        let header = VolumeHeader::new(6, 8, 1, 1);
        assert!(matches!(
            header.layout_for(4),
            Err(OverlayError::ShapeMismatch { expected: 8, width: 6, .. })
        ));
    }

    #[test]
    fn test_neither_axis_carries_targets() {
        assert!(VolumeHeader::new(8, 1, 1, 1).layout_for(4).is_err());
        assert!(VolumeHeader::new(8, 3, 1, 8).layout_for(4).is_err());
        assert!(VolumeHeader::new(0, 1, 1, 0).layout_for(0).is_err());
    }

    #[test]
    fn test_seed_row_both_layouts() {
        // value(x, y) = 10 * x + y
        let mut row_major = Array4::<f32>::zeros((4, 4, 1, 1));
        let mut frame_major = Array4::<f32>::zeros((4, 1, 1, 4));
        for x in 0..4 {
            for y in 0..4 {
                row_major[[x, y, 0, 0]] = (10 * x + y) as f32;
                frame_major[[x, 0, 0, y]] = (10 * x + y) as f32;
            }
        }

        let mut out = [0.0; 2];
        CorrelationVolume::new(row_major)
            .seed_row_into(CorrelationLayout::RowMajor, 3, 2, &mut out)
            .unwrap();
        assert_eq!(out, [32.0, 33.0]);

        CorrelationVolume::new(frame_major)
            .seed_row_into(CorrelationLayout::FrameMajor, 1, 0, &mut out)
            .unwrap();
        assert_eq!(out, [10.0, 11.0]);
    }

    #[test]
    fn test_seed_row_out_of_range() {
        let volume = CorrelationVolume::new(Array4::zeros((4, 4, 1, 1)));
        let mut out = [0.0; 2];
        assert!(volume.seed_row_into(CorrelationLayout::RowMajor, 4, 0, &mut out).is_err());
        assert!(volume.seed_row_into(CorrelationLayout::RowMajor, 0, 3, &mut out).is_err());
    }

    #[test]
    fn test_from_shape_vec_length_checked() {
        let header = VolumeHeader::new(2, 2, 1, 1);
        assert!(CorrelationVolume::from_shape_vec(header, vec![0.0; 3]).is_err());
        let volume = CorrelationVolume::from_shape_vec(header, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(volume.value(1, 0, 0, 0), Some(3.0));
        assert_eq!(volume.value(2, 0, 0, 0), None);
    }
}
