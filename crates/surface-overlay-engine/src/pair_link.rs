// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Pair Link
//!
//! Symmetric link between two overlays showing the same correlation data
//! (typically one per hemisphere surface). The pair shares one property
//! object and one correlation volume:
//! - exactly one side holds [`VolumeSlot::Owned`], the other a
//!   [`VolumeSlot::Borrowed`] handle to the same data
//! - each side refers to the other through a [`Weak`] handle
//! - dropping either side clears the survivor's link and, if the dropped
//!   side owned the volume, hands ownership to the survivor
//! - if the survivor is locked at that moment its link simply expires; it
//!   keeps reading the volume and counts as owner once unpaired

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::correlation::VolumeSlot;
use crate::overlay::{OverlayHandle, SurfaceOverlay};
use crate::types::{OverlayError, Result};

/// Back-reference from one overlay to its partner
#[derive(Debug, Clone)]
pub struct PairLink {
    partner: Weak<RwLock<SurfaceOverlay>>,
}

impl PairLink {
    fn new(partner: &OverlayHandle) -> Self {
        Self {
            partner: Arc::downgrade(partner),
        }
    }

    pub fn partner(&self) -> Option<OverlayHandle> {
        self.partner.upgrade()
    }
}

/// Pair `overlay` with `source`, which must already hold correlation data
///
/// `overlay` adopts `source`'s property object and reads `source`'s volume
/// through a borrowed slot; `source` stays the owner.
pub fn pair_overlays(overlay: &OverlayHandle, source: &OverlayHandle) -> Result<()> {
    if Arc::ptr_eq(overlay, source) {
        return Err(OverlayError::PairingUnavailable(
            "an overlay cannot be paired with itself".to_string(),
        ));
    }

    let mut target = overlay.write();
    let mut donor = source.write();

    let Some(layout) = donor.seeded.layout() else {
        return Err(OverlayError::PairingUnavailable(format!(
            "'{}' has no correlation data",
            donor.name()
        )));
    };
    if target.pair.is_some() || donor.pair.is_some() {
        return Err(OverlayError::PairingUnavailable(format!(
            "'{}' or '{}' is already paired",
            target.name(),
            donor.name()
        )));
    }
    if target.vertex_count() != donor.vertex_count() {
        return Err(OverlayError::PairingUnavailable(format!(
            "'{}' has {} vertices, '{}' has {}",
            target.name(),
            target.vertex_count(),
            donor.name(),
            donor.vertex_count()
        )));
    }

    target.property = Arc::clone(&donor.property);
    let borrowed = donor.seeded.volume.borrowed();
    target.seeded.install(borrowed, layout);
    target.pair = Some(PairLink::new(source));
    donor.pair = Some(PairLink::new(overlay));

    info!(
        target: "surface-overlay-engine",
        "Paired overlay '{}' ({}) with '{}' ({})",
        target.name(),
        target.hemisphere(),
        donor.name(),
        donor.hemisphere()
    );
    Ok(())
}

/// Detach `overlay` from its partner while it is being dropped
pub(crate) fn unlink(overlay: &mut SurfaceOverlay) {
    let Some(link) = overlay.pair.take() else {
        return;
    };
    let Some(partner) = link.partner() else {
        return;
    };
    let Some(mut survivor) = partner.try_write() else {
        warn!(
            target: "surface-overlay-engine",
            "Partner of '{}' is locked; its link expires and it keeps the shared volume", overlay.name()
        );
        return;
    };

    survivor.pair = None;
    if let VolumeSlot::Owned(volume) = std::mem::take(&mut overlay.seeded.volume) {
        survivor.seeded.adopt(volume);
        info!(
            target: "surface-overlay-engine",
            "'{}' took over the correlation volume from '{}'", survivor.name(), overlay.name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemorySurface, InMemoryVolumeReader};
    use crate::types::{CorrelationVolume, Hemisphere, MeshAdjacency};
    use ndarray::Array4;
    use std::path::Path;

    fn overlay(name: &str) -> OverlayHandle {
        let adjacency = MeshAdjacency::from_neighbor_lists(&[vec![1], vec![0]]);
        let surface = Arc::new(InMemorySurface::new(vec![0.0, 0.0], adjacency, Hemisphere::Left));
        SurfaceOverlay::with_defaults(name, surface).unwrap().into_handle()
    }

    fn loaded(name: &str) -> OverlayHandle {
        let handle = overlay(name);
        let mut reader = InMemoryVolumeReader::new();
        reader.insert("corr.mgz", CorrelationVolume::new(Array4::zeros((4, 4, 1, 1))));
        handle
            .write()
            .load_correlation_data(Path::new("corr.mgz"), &reader, &mut |_: u8| {})
            .unwrap();
        handle
    }

    #[test]
    fn test_requires_source_data() {
        let a = overlay("a");
        let b = overlay("b");
        assert!(matches!(pair_overlays(&a, &b), Err(OverlayError::PairingUnavailable(_))));
        assert!(matches!(pair_overlays(&a, &a), Err(OverlayError::PairingUnavailable(_))));
    }

    #[test]
    fn test_pairing_is_symmetric() {
        let a = overlay("a");
        let b = loaded("b");
        pair_overlays(&a, &b).unwrap();

        assert!(a.read().is_paired());
        assert!(b.read().is_paired());
        assert!(Arc::ptr_eq(&a.read().partner().unwrap(), &b));
        assert!(Arc::ptr_eq(&b.read().partner().unwrap(), &a));
        assert!(b.read().owns_correlation_volume());
        assert!(!a.read().owns_correlation_volume());
        assert!(a.read().has_correlation_data());
        assert!(Arc::ptr_eq(&a.read().property(), &b.read().property()));

        assert!(matches!(pair_overlays(&a, &b), Err(OverlayError::PairingUnavailable(_))));
    }

    #[test]
    fn test_dropping_owner_transfers_volume() {
        let a = overlay("a");
        let b = loaded("b");
        pair_overlays(&a, &b).unwrap();

        drop(b);
        let survivor = a.read();
        assert!(!survivor.is_paired());
        assert!(survivor.owns_correlation_volume());
        assert!(survivor.seeded.current().is_ok());
    }

    #[test]
    fn test_dropping_owner_while_partner_locked_keeps_volume() {
        let a = overlay("a");
        let b = loaded("b");
        pair_overlays(&a, &b).unwrap();

        let mut survivor = a.write();
        drop(b);

        assert!(!survivor.is_paired());
        assert!(survivor.has_correlation_data());
        assert!(survivor.owns_correlation_volume());
        survivor
            .update_correlation_at_vertex(1, crate::types::HemisphereSelector::Own)
            .unwrap();
    }

    #[test]
    fn test_dropping_borrower_keeps_owner_volume() {
        let a = overlay("a");
        let b = loaded("b");
        pair_overlays(&a, &b).unwrap();

        drop(a);
        let owner = b.read();
        assert!(!owner.is_paired());
        assert!(owner.owns_correlation_volume());
        assert!(owner.seeded.current().is_ok());
    }
}
