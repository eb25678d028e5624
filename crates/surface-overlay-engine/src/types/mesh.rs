// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Mesh adjacency in compressed sparse row form

use ahash::AHashSet;

/// Direct neighbours of every vertex of a surface mesh
///
/// Stored as CSR: `neighbors[offsets[v]..offsets[v + 1]]` are the neighbours of `v`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshAdjacency {
    offsets: Vec<usize>,
    neighbors: Vec<u32>,
}

impl MeshAdjacency {
    /// Build from explicit per-vertex neighbour lists
    ///
    /// Neighbours `>= lists.len()` are skipped, so every stored index is a
    /// valid vertex.
    pub fn from_neighbor_lists(lists: &[Vec<usize>]) -> Self {
        let vertex_count = lists.len();
        let mut offsets = Vec::with_capacity(vertex_count + 1);
        let mut neighbors = Vec::with_capacity(lists.iter().map(Vec::len).sum());
        offsets.push(0);
        for list in lists {
            neighbors.extend(list.iter().filter(|&&n| n < vertex_count).map(|&n| n as u32));
            offsets.push(neighbors.len());
        }
        Self { offsets, neighbors }
    }

    /// Build from a triangle list; every triangle edge links its two vertices
    ///
    /// Triangles referencing vertices `>= vertex_count` are skipped.
    pub fn from_triangles(vertex_count: usize, triangles: &[[u32; 3]]) -> Self {
        let mut sets: Vec<AHashSet<u32>> = vec![AHashSet::new(); vertex_count];
        for triangle in triangles {
            if triangle.iter().any(|&v| v as usize >= vertex_count) {
                continue;
            }
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                let (va, vb) = (triangle[a], triangle[b]);
                if va != vb {
                    sets[va as usize].insert(vb);
                    sets[vb as usize].insert(va);
                }
            }
        }

        let mut offsets = Vec::with_capacity(vertex_count + 1);
        let mut neighbors = Vec::new();
        offsets.push(0);
        for set in sets {
            let mut sorted: Vec<u32> = set.into_iter().collect();
            sorted.sort_unstable();
            neighbors.extend(sorted);
            offsets.push(neighbors.len());
        }
        Self { offsets, neighbors }
    }

    pub fn vertex_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Neighbours of `vertex` (empty for out-of-range vertices)
    pub fn neighbors(&self, vertex: usize) -> &[u32] {
        match (self.offsets.get(vertex), self.offsets.get(vertex + 1)) {
            (Some(&start), Some(&end)) => &self.neighbors[start..end],
            _ => &[],
        }
    }

    pub fn degree(&self, vertex: usize) -> usize {
        self.neighbors(vertex).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_triangles_dedups_shared_edges() {
        // Two triangles sharing edge 1-2
        let adjacency = MeshAdjacency::from_triangles(4, &[[0, 1, 2], [1, 3, 2]]);
        assert_eq!(adjacency.vertex_count(), 4);
        assert_eq!(adjacency.neighbors(0), &[1, 2]);
        assert_eq!(adjacency.neighbors(1), &[0, 2, 3]);
        assert_eq!(adjacency.neighbors(2), &[0, 1, 3]);
        assert_eq!(adjacency.neighbors(3), &[1, 2]);
    }

    #[test]
    fn test_out_of_range_triangle_skipped() {
        let adjacency = MeshAdjacency::from_triangles(3, &[[0, 1, 7]]);
        assert_eq!(adjacency.degree(0), 0);
        assert!(adjacency.neighbors(10).is_empty());
    }

    #[test]
    fn test_from_neighbor_lists() {
        let adjacency = MeshAdjacency::from_neighbor_lists(&[vec![1], vec![0, 2], vec![1]]);
        assert_eq!(adjacency.vertex_count(), 3);
        assert_eq!(adjacency.neighbors(1), &[0, 2]);
    }

    #[test]
    fn test_out_of_range_neighbor_skipped() {
        let adjacency = MeshAdjacency::from_neighbor_lists(&[vec![1], vec![0, 5]]);
        assert_eq!(adjacency.vertex_count(), 2);
        assert_eq!(adjacency.neighbors(1), &[0]);
    }
}
