// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for overlay operations

/// Errors surfaced by overlay operations
///
/// A failed operation never leaves the active, unsmoothed or range views
/// partially updated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OverlayError {
    #[error("failed to allocate {requested} scalar values")]
    AllocationFailure { requested: usize },

    #[error(
        "correlation data does not match surface: expected width {expected} and height or frames {expected}, got {width}x{height} with {frames} frames"
    )]
    ShapeMismatch {
        expected: usize,
        width: usize,
        height: usize,
        frames: usize,
    },

    #[error("unable to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("reference volume is no longer available")]
    StaleReference,

    #[error("frame count mismatch: expected {expected}, got {actual}")]
    FrameCountMismatch { expected: usize, actual: usize },

    #[error("vertex count mismatch: expected {expected}, got {actual}")]
    VertexCountMismatch { expected: usize, actual: usize },

    #[error("buffer of {actual} values cannot hold {vertices} vertices x {frames} frames")]
    BufferSizeMismatch {
        vertices: usize,
        frames: usize,
        actual: usize,
    },

    #[error("invalid hemisphere selector {0} (expected -1, 0 or 1)")]
    InvalidHemisphere(i32),

    #[error("no correlation volume loaded")]
    NoCorrelationVolume,

    #[error("scalar buffer has not been initialized")]
    NotInitialized,

    #[error("vertex {vertex} out of range for {vertex_count} vertices")]
    VertexOutOfRange { vertex: usize, vertex_count: usize },

    #[error("cannot pair overlays: {0}")]
    PairingUnavailable(String),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
