// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory collaborators
//!
//! Implementations of the collaborator traits backed by plain memory, for
//! embedders without their own geometry or file layer and for tests.

mod reader;
mod reference;
mod surface;

pub use reader::InMemoryVolumeReader;
pub use reference::InMemoryReferenceVolume;
pub use surface::InMemorySurface;
