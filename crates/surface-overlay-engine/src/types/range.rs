// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Closed value interval `[min, max]` of an overlay field
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Correlation coefficients are bounded by construction
    pub const CORRELATION: ValueRange = ValueRange { min: -1.0, max: 1.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Bounds of `values`; `None` when empty. NaN entries are ignored.
    pub fn of(values: &[f32]) -> Option<Self> {
        let first = *values.first()?;
        let (min, max) = values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(Self::new(min as f64, max as f64))
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// True for an empty or single-point interval
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_values() {
        let range = ValueRange::of(&[3.0, -2.0, 7.5, 0.0]).unwrap();
        assert_eq!(range, ValueRange::new(-2.0, 7.5));
        assert_eq!(range.span(), 9.5);
        assert!(range.contains(0.0));
        assert!(!range.is_degenerate());
    }

    #[test]
    fn test_empty_and_constant() {
        assert!(ValueRange::of(&[]).is_none());
        assert!(ValueRange::of(&[4.0, 4.0]).unwrap().is_degenerate());
        assert!(ValueRange::default().is_degenerate());
    }

    #[test]
    fn test_nan_ignored() {
        let range = ValueRange::of(&[1.0, f32::NAN, 2.0]).unwrap();
        assert_eq!(range, ValueRange::new(1.0, 2.0));
    }
}
