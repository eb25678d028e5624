// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::types::{Hemisphere, MeshAdjacency};

/// Read access to the surface an overlay is drawn on
pub trait SurfaceAccess: Send + Sync {
    fn vertex_count(&self) -> usize;

    /// Scalar attached to the vertex when the surface was loaded
    fn vertex_value(&self, vertex: usize) -> f32;

    fn adjacency(&self) -> &MeshAdjacency;

    fn hemisphere(&self) -> Hemisphere;

    /// Ask the rendering layer to re-map overlay colors
    fn request_overlay_refresh(&self);
}
