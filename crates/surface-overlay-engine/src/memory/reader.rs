// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use ahash::AHashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::traits::{ProgressSink, VolumeReader};
use crate::types::{CorrelationVolume, OverlayError, Result, VolumeHeader};

/// Volume reader serving preloaded volumes by path
#[derive(Debug, Default)]
pub struct InMemoryVolumeReader {
    volumes: AHashMap<PathBuf, CorrelationVolume>,
    /// Paths whose header probe succeeds but whose full read fails
    truncated: AHashMap<PathBuf, VolumeHeader>,
    full_reads: AtomicUsize,
}

impl InMemoryVolumeReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, volume: CorrelationVolume) {
        self.volumes.insert(path.into(), volume);
    }

    /// Register a file that has a readable header but unreadable voxel data
    pub fn insert_truncated(&mut self, path: impl Into<PathBuf>, header: VolumeHeader) {
        self.truncated.insert(path.into(), header);
    }

    /// Number of full reads attempted
    pub fn full_read_count(&self) -> usize {
        self.full_reads.load(Ordering::Relaxed)
    }

    fn missing(path: &Path, reason: &str) -> OverlayError {
        OverlayError::Io {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl VolumeReader for InMemoryVolumeReader {
    fn read_header(&self, path: &Path) -> Result<VolumeHeader> {
        if let Some(volume) = self.volumes.get(path) {
            return Ok(volume.header());
        }
        self.truncated
            .get(path)
            .copied()
            .ok_or_else(|| Self::missing(path, "no such volume"))
    }

    fn read_volume(&self, path: &Path, progress: &mut dyn ProgressSink) -> Result<CorrelationVolume> {
        self.full_reads.fetch_add(1, Ordering::Relaxed);
        progress.report(0);
        let Some(volume) = self.volumes.get(path) else {
            return Err(Self::missing(path, "voxel data unavailable"));
        };
        for percent in (10..=100).step_by(10) {
            progress.report(percent);
        }
        Ok(volume.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_reads_registered_volume() {
        let mut reader = InMemoryVolumeReader::new();
        reader.insert("a.mgz", CorrelationVolume::new(Array4::zeros((2, 2, 1, 1))));

        assert_eq!(reader.read_header(Path::new("a.mgz")).unwrap(), VolumeHeader::new(2, 2, 1, 1));

        let mut seen = Vec::new();
        let volume = reader
            .read_volume(Path::new("a.mgz"), &mut |p: u8| seen.push(p))
            .unwrap();
        assert_eq!(volume.header().width, 2);
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
        assert_eq!(reader.full_read_count(), 1);
    }

    #[test]
    fn test_missing_and_truncated() {
        let mut reader = InMemoryVolumeReader::new();
        reader.insert_truncated("b.mgz", VolumeHeader::new(4, 4, 1, 1));

        assert!(matches!(reader.read_header(Path::new("none.mgz")), Err(OverlayError::Io { .. })));
        assert!(reader.read_header(Path::new("b.mgz")).is_ok());
        assert!(matches!(
            reader.read_volume(Path::new("b.mgz"), &mut |_: u8| {}),
            Err(OverlayError::Io { .. })
        ));
    }
}
