// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Volume reading and progress reporting

use std::path::Path;

use crate::types::{CorrelationVolume, Result, VolumeHeader};

/// Reads correlation volumes from storage
///
/// Implementations map I/O and format problems to `OverlayError::Io`.
pub trait VolumeReader: Send + Sync {
    /// Probe dimensions without loading voxel data
    fn read_header(&self, path: &Path) -> Result<VolumeHeader>;

    /// Full (potentially slow) read, reporting 0-100% to `progress`
    fn read_volume(&self, path: &Path, progress: &mut dyn ProgressSink) -> Result<CorrelationVolume>;
}

/// Receives percentage updates during long reads
pub trait ProgressSink {
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Logs progress at debug level
#[derive(Debug, Clone)]
pub struct TracingProgress {
    label: String,
}

impl TracingProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl ProgressSink for TracingProgress {
    fn report(&mut self, percent: u8) {
        tracing::debug!(target: "surface-overlay-engine", "{}: {}%", self.label, percent);
    }
}

/// Forwards a report only after progress advanced by `interval` percent;
/// 100% is always forwarded once.
pub struct ThrottledProgress<'a> {
    inner: &'a mut dyn ProgressSink,
    interval: u8,
    last: Option<u8>,
}

impl<'a> ThrottledProgress<'a> {
    pub fn new(inner: &'a mut dyn ProgressSink, interval: u8) -> Self {
        Self {
            inner,
            interval: interval.max(1),
            last: None,
        }
    }
}

impl ProgressSink for ThrottledProgress<'_> {
    fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        let forward = match self.last {
            None => true,
            Some(last) if percent == 100 => last != 100,
            Some(last) => percent >= last.saturating_add(self.interval),
        };
        if forward {
            self.last = Some(percent);
            self.inner.report(percent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |p: u8| seen.push(p);
            sink.report(10);
            sink.report(20);
        }
        assert_eq!(seen, vec![10, 20]);
    }

    #[test]
    fn test_throttled_progress() {
        let mut seen = Vec::new();
        let mut sink = |p: u8| seen.push(p);
        {
            let mut throttled = ThrottledProgress::new(&mut sink, 25);
            for p in 0..=100u8 {
                throttled.report(p);
            }
            throttled.report(100);
        }
        assert_eq!(seen, vec![0, 25, 50, 75, 100]);
    }
}
