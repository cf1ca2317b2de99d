//! Frame driver.
//!
//! Feeds captured orbits through a software peak source and an extractor,
//! one bunch crossing per clock edge, the way the firmware pipeline clocks
//! its sample stream.

use tracing::{debug, warn};

use super::models::PeakSource;
use crate::common::constants::ORBIT_EXCESS;
use crate::config::ExtractorConfig;
use crate::pipeline::{EventExtractor, ExtractorOutput};

/// Drives a [`PeakSource`] and an [`EventExtractor`] in lockstep.
#[derive(Debug)]
pub struct FrameDriver<S> {
    source: S,
    extractor: EventExtractor,
    samples_per_bx: usize,
}

impl<S: PeakSource> FrameDriver<S> {
    /// Creates a driver whose extractor is shaped by `source`.
    pub fn new(config: &ExtractorConfig, source: S) -> Self {
        let shape = source.shape(config);
        Self {
            source,
            extractor: EventExtractor::new(config, shape),
            samples_per_bx: config.samples_per_bx.max(1),
        }
    }

    /// Drives one orbit of concatenated samples.
    ///
    /// The orbit is cut into bunch crossings of `samples_per_bx` samples. A
    /// trailing partial crossing is dropped. Fewer crossings than the orbit
    /// length end the orbit early.
    ///
    /// # Returns
    ///
    /// The number of bunch crossings clocked.
    pub fn drive_orbit(&mut self, samples: &[u32]) -> usize {
        let chunks = samples.chunks_exact(self.samples_per_bx);
        let leftover = chunks.remainder().len();
        if leftover > 0 {
            warn!(
                leftover,
                samples_per_bx = self.samples_per_bx,
                "partial bunch crossing dropped"
            );
        }

        let source = &mut self.source;
        let edges = chunks.map(|bx| (bx, source.inspect(bx)));
        let clocked = self.extractor.process_frame(edges);
        debug!(orbit = self.extractor.orbit(), clocked, "orbit driven");
        clocked
    }

    /// Drives one raw capture orbit.
    ///
    /// Raw captures carry [`ORBIT_EXCESS`] trailing samples past the last
    /// bunch crossing; these are stripped before the orbit is driven. A
    /// capture no longer than the excess clocks nothing.
    ///
    /// # Returns
    ///
    /// The number of bunch crossings clocked.
    pub fn drive_capture(&mut self, raw: &[u32]) -> usize {
        let Some(len) = raw.len().checked_sub(ORBIT_EXCESS).filter(|&len| len > 0) else {
            warn!(len = raw.len(), excess = ORBIT_EXCESS, "capture shorter than orbit excess");
            return 0;
        };
        self.drive_orbit(&raw[..len])
    }

    /// Drives several orbits in order.
    ///
    /// # Returns
    ///
    /// The total number of bunch crossings clocked.
    pub fn drive_orbits<'a, I>(&mut self, orbits: I) -> usize
    where
        I: IntoIterator<Item = &'a [u32]>,
    {
        orbits.into_iter().map(|orbit| self.drive_orbit(orbit)).sum()
    }

    /// The peak source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The extractor.
    pub const fn extractor(&self) -> &EventExtractor {
        &self.extractor
    }

    /// Mutable access to the extractor.
    pub const fn extractor_mut(&mut self) -> &mut EventExtractor {
        &mut self.extractor
    }

    /// Consumes the driver and returns every record.
    pub fn finish(self) -> ExtractorOutput {
        self.extractor.finish()
    }
}
