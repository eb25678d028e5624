// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Smoothing Stage
//!
//! Iterative neighbour averaging over the surface mesh. Each iteration sets
//! every vertex to the mean of itself and its direct neighbours, reading
//! only values from the previous iteration.

use surface_overlay_config::SmoothingConfig;
use tracing::trace;

use crate::types::{try_alloc, MeshAdjacency, OverlayError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothingStage {
    default_steps: u32,
}

impl SmoothingStage {
    pub fn new(default_steps: u32) -> Self {
        Self {
            default_steps: default_steps.max(1),
        }
    }

    pub fn from_config(config: &SmoothingConfig) -> Self {
        Self::new(config.default_steps)
    }

    pub fn default_steps(&self) -> u32 {
        self.default_steps
    }

    /// Step count for a request: `requested` if >= 1, else the property's
    /// count, else the configured default
    pub fn resolve_steps(&self, requested: u32, property_steps: u32) -> u32 {
        if requested >= 1 {
            requested
        } else if property_steps >= 1 {
            property_steps
        } else {
            self.default_steps
        }
    }

    /// Smooth `input` for `steps` iterations into a new field
    pub fn smooth(&self, adjacency: &MeshAdjacency, input: &[f32], steps: u32) -> Result<Vec<f32>> {
        let n = adjacency.vertex_count();
        if input.len() != n {
            return Err(OverlayError::VertexCountMismatch {
                expected: n,
                actual: input.len(),
            });
        }

        let mut current = try_alloc(n)?;
        let mut next = try_alloc(n)?;
        current.copy_from_slice(input);

        for _ in 0..steps {
            for (vertex, out) in next.iter_mut().enumerate() {
                let neighbors = adjacency.neighbors(vertex);
                let mut sum = current[vertex] as f64;
                for &nb in neighbors {
                    let value = current.get(nb as usize).ok_or(OverlayError::VertexOutOfRange {
                        vertex: nb as usize,
                        vertex_count: n,
                    })?;
                    sum += *value as f64;
                }
                *out = (sum / (neighbors.len() + 1) as f64) as f32;
            }
            std::mem::swap(&mut current, &mut next);
        }

        trace!(target: "surface-overlay-engine", "Smoothed {} vertices over {} steps", n, steps);
        Ok(current)
    }
}

impl Default for SmoothingStage {
    fn default() -> Self {
        Self::from_config(&SmoothingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path3() -> MeshAdjacency {
        MeshAdjacency::from_neighbor_lists(&[vec![1], vec![0, 2], vec![1]])
    }

    #[test]
    fn test_single_step() {
        let stage = SmoothingStage::new(1);
        let out = stage.smooth(&path3(), &[0.0, 3.0, 6.0], 1).unwrap();
        assert!((out[0] - 1.5).abs() < 1e-5);
        assert!((out[1] - 3.0).abs() < 1e-5);
        assert!((out[2] - 4.5).abs() < 1e-5);
    }

    #[test]
    fn test_zero_steps_is_identity() {
        let stage = SmoothingStage::default();
        let out = stage.smooth(&path3(), &[1.0, 5.0, 2.0], 0).unwrap();
        assert_eq!(out, vec![1.0, 5.0, 2.0]);
    }

    #[test]
    fn test_constant_field_is_fixed_point() {
        let stage = SmoothingStage::default();
        let out = stage.smooth(&path3(), &[2.5; 3], 10).unwrap();
        assert!(out.iter().all(|v| (v - 2.5).abs() < 1e-6));
    }

    #[test]
    fn test_isolated_vertex_unchanged() {
        let adjacency = MeshAdjacency::from_neighbor_lists(&[vec![], vec![2], vec![1]]);
        let out = SmoothingStage::default().smooth(&adjacency, &[7.0, 0.0, 4.0], 3).unwrap();
        assert_eq!(out[0], 7.0);
    }

    #[test]
    fn test_dangling_neighbor_does_not_panic() {
        let adjacency = MeshAdjacency::from_neighbor_lists(&[vec![1], vec![0, 5]]);
        let out = SmoothingStage::default().smooth(&adjacency, &[0.0, 4.0], 1).unwrap();
        assert!((out[0] - 2.0).abs() < 1e-5);
        assert!((out[1] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_size_mismatch() {
        let err = SmoothingStage::default().smooth(&path3(), &[1.0], 1).unwrap_err();
        assert_eq!(err, OverlayError::VertexCountMismatch { expected: 3, actual: 1 });
    }

    #[test]
    fn test_resolve_steps() {
        let stage = SmoothingStage::new(5);
        assert_eq!(stage.resolve_steps(3, 8), 3);
        assert_eq!(stage.resolve_steps(0, 8), 8);
        assert_eq!(stage.resolve_steps(0, 0), 5);
        assert_eq!(SmoothingStage::new(0).default_steps(), 1);
    }
}
