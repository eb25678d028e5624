// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::traits::SurfaceAccess;
use crate::types::{Hemisphere, MeshAdjacency};

/// Surface held as a value array plus adjacency
#[derive(Debug)]
pub struct InMemorySurface {
    values: Vec<f32>,
    adjacency: MeshAdjacency,
    hemisphere: Hemisphere,
    refresh_count: AtomicUsize,
}

impl InMemorySurface {
    pub fn new(values: Vec<f32>, adjacency: MeshAdjacency, hemisphere: Hemisphere) -> Self {
        Self {
            values,
            adjacency,
            hemisphere,
            refresh_count: AtomicUsize::new(0),
        }
    }

    /// Number of refresh requests received so far
    pub fn refresh_count(&self) -> usize {
        self.refresh_count.load(Ordering::Relaxed)
    }
}

impl SurfaceAccess for InMemorySurface {
    fn vertex_count(&self) -> usize {
        self.values.len()
    }

    fn vertex_value(&self, vertex: usize) -> f32 {
        self.values.get(vertex).copied().unwrap_or(0.0)
    }

    fn adjacency(&self) -> &MeshAdjacency {
        &self.adjacency
    }

    fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    fn request_overlay_refresh(&self) {
        self.refresh_count.fetch_add(1, Ordering::Relaxed);
    }
}
