// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Receives "data updated" notifications from an overlay
pub trait OverlayObserver: Send + Sync {
    fn data_updated(&self, overlay_name: &str);
}
