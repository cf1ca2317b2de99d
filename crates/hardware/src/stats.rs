//! Extraction run statistics.
//!
//! This module tracks what a run of the pulse extractor produced. It provides:
//! 1. **Clocking:** Edges processed and orbits completed, including short orbits.
//! 2. **Detections:** Initial detections, total and consecutive pulses.
//! 3. **Snapshots:** Waveform records and double-pulse classifications.

use std::fmt;

/// Counters accumulated by an [`EventExtractor`](crate::pipeline::EventExtractor).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractorStats {
    /// Clock edges processed.
    pub edges: u64,
    /// Orbits completed, full or short.
    pub orbits: u64,
    /// Orbits that ended before reaching the configured length.
    pub short_orbits: u64,
    /// Edges on which detection started from the scan state.
    pub detections: u64,
    /// Pulses emitted.
    pub pulses: u64,
    /// Pulses emitted on follow-on edges of a detection.
    pub consecutive_pulses: u64,
    /// Waveform records emitted.
    pub waveforms: u64,
    /// Edges classified as a double pulse.
    pub double_pulses: u64,
    /// Hits dropped because their channel exceeded the detector shape.
    pub discarded_hits: u64,
}

impl ExtractorStats {
    /// Fraction of pulses that were consecutive follow-ons, or zero without pulses.
    pub fn consecutive_fraction(&self) -> f64 {
        if self.pulses == 0 {
            0.0
        } else {
            self.consecutive_pulses as f64 / self.pulses as f64
        }
    }
}

impl fmt::Display for ExtractorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "orbits                   {} ({} short)", self.orbits, self.short_orbits)?;
        writeln!(f, "edges                    {}", self.edges)?;
        writeln!(f, "detections               {}", self.detections)?;
        writeln!(
            f,
            "pulses                   {} ({} consecutive, {:.2}%)",
            self.pulses,
            self.consecutive_pulses,
            self.consecutive_fraction() * 100.0
        )?;
        writeln!(f, "waveforms                {}", self.waveforms)?;
        writeln!(f, "double_pulses            {}", self.double_pulses)?;
        write!(f, "discarded_hits           {}", self.discarded_hits)
    }
}
