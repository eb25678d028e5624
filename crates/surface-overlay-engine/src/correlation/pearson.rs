// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pearson correlation coefficient
//!
//! Pure functions; accumulation happens in `f64`.

/// Variance below this is treated as zero
const VARIANCE_EPSILON: f64 = 1e-12;

/// Pearson correlation `cov(x, y) / (std(x) * std(y))`
///
/// Returns `degenerate` when fewer than two samples are available or either
/// series has zero variance. The result is clamped to `[-1, 1]`.
///
/// # Example
/// ```
/// use surface_overlay_engine::pearson_correlation;
///
/// let r = pearson_correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0], 0.0);
/// assert!((r - 1.0).abs() < 1e-6);
///
/// // Constant series has no variance
/// assert_eq!(pearson_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0], 0.0), 0.0);
/// ```
pub fn pearson_correlation(x: &[f32], y: &[f32], degenerate: f32) -> f32 {
    debug_assert_eq!(x.len(), y.len());
    let count = x.len().min(y.len());
    if count < 2 {
        return degenerate;
    }
    let (x, y) = (&x[..count], &y[..count]);

    let n = count as f64;
    let mean_x = x.iter().map(|&v| v as f64).sum::<f64>() / n;
    let mean_y = y.iter().map(|&v| v as f64).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a as f64 - mean_x;
        let dy = b as f64 - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    if variance_x <= VARIANCE_EPSILON || variance_y <= VARIANCE_EPSILON {
        return degenerate;
    }
    if !covariance.is_finite() || !variance_x.is_finite() || !variance_y.is_finite() {
        return degenerate;
    }

    (covariance / (variance_x.sqrt() * variance_y.sqrt())).clamp(-1.0, 1.0) as f32
}
