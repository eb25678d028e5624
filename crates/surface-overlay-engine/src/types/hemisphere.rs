// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{OverlayError, Result};

/// One half of a left/right surface pair
///
/// The discriminant is the block index of the hemisphere inside a combined
/// `2N` correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    Left = 0,
    Right = 1,
}

impl Hemisphere {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Hemisphere::Left),
            1 => Some(Hemisphere::Right),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Hemisphere::Left => Hemisphere::Right,
            Hemisphere::Right => Hemisphere::Left,
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hemisphere::Left => write!(f, "lh"),
            Hemisphere::Right => write!(f, "rh"),
        }
    }
}

/// Which hemisphere a seed vertex belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HemisphereSelector {
    /// The hemisphere of the overlay's own surface
    #[default]
    Own,
    Explicit(Hemisphere),
}

impl HemisphereSelector {
    /// Map the legacy integer convention (`-1` = own, `0` = left, `1` = right)
    pub fn from_raw(raw: i32) -> Result<Self> {
        if raw == -1 {
            return Ok(HemisphereSelector::Own);
        }
        Hemisphere::from_index(raw)
            .map(HemisphereSelector::Explicit)
            .ok_or(OverlayError::InvalidHemisphere(raw))
    }

    pub fn resolve(self, own: Hemisphere) -> Hemisphere {
        match self {
            HemisphereSelector::Own => own,
            HemisphereSelector::Explicit(hemisphere) => hemisphere,
        }
    }
}

impl From<Hemisphere> for HemisphereSelector {
    fn from(hemisphere: Hemisphere) -> Self {
        HemisphereSelector::Explicit(hemisphere)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_from_raw() {
        assert_eq!(HemisphereSelector::from_raw(-1).unwrap(), HemisphereSelector::Own);
        assert_eq!(
            HemisphereSelector::from_raw(1).unwrap(),
            HemisphereSelector::Explicit(Hemisphere::Right)
        );
        assert_eq!(
            HemisphereSelector::from_raw(2).unwrap_err(),
            OverlayError::InvalidHemisphere(2)
        );
    }

    #[test]
    fn test_resolve_own() {
        assert_eq!(HemisphereSelector::Own.resolve(Hemisphere::Right), Hemisphere::Right);
        assert_eq!(
            HemisphereSelector::from(Hemisphere::Left).resolve(Hemisphere::Right),
            Hemisphere::Left
        );
    }

    #[test]
    fn test_block_index() {
        assert_eq!(Hemisphere::Left.index(), 0);
        assert_eq!(Hemisphere::Right.index(), 1);
        assert_eq!(Hemisphere::Left.opposite(), Hemisphere::Right);
    }
}
