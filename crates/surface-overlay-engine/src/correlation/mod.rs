// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Correlation Engine
//!
//! Two ways of turning overlay data into correlation maps:
//! - **Seeded** ([`seeded`]): look up one row of a preloaded all-pairs
//!   correlation volume for a queried seed vertex
//! - **Live** ([`live`]): Pearson correlation of every vertex's frame series
//!   against a reference time series sampled from another volume

pub mod live;
pub mod pearson;
pub mod seeded;

pub use live::LiveCorrelation;
pub use pearson::pearson_correlation;
pub use seeded::{SeededCorrelation, VolumeSlot};
