//! Peak detector interface.
//!
//! A detector asserts a peak indicator on one or more channels per clock edge
//! and reports side-channel values (amplitude, position, optionally time over
//! threshold) valid on the same edge. This module describes that per-edge
//! report and the detector shape the extractor is parameterized by.

use std::fmt;

use crate::config::ExtractorConfig;

/// One asserted channel on one clock edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeakHit {
    /// Indicator channel that asserted.
    pub channel: u32,
    /// Reported peak value.
    pub amplitude: i64,
    /// Sample index of the peak within the bunch crossing.
    pub position: u32,
    /// Time over threshold, when the detector reports it.
    pub tot: Option<u32>,
}

/// Everything a detector presents on one clock edge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeReport {
    /// Asserted channels; empty when no peak indicator is set.
    pub hits: Vec<PeakHit>,
    /// Derived signal for this bunch crossing, when the detector produces one.
    pub derived: Option<Vec<i64>>,
}

impl EdgeReport {
    /// A report with no asserted channel and no derived signal.
    pub const fn quiet() -> Self {
        Self {
            hits: Vec::new(),
            derived: None,
        }
    }

    /// A report with the given hits and no derived signal.
    pub const fn with_hits(hits: Vec<PeakHit>) -> Self {
        Self {
            hits,
            derived: None,
        }
    }

    /// Attaches a derived signal vector.
    #[must_use]
    pub fn with_derived(mut self, derived: Vec<i64>) -> Self {
        self.derived = Some(derived);
        self
    }

    /// Returns `true` if any channel asserted.
    pub fn is_asserted(&self) -> bool {
        !self.hits.is_empty()
    }

    /// Bitmask of asserted channels (channels 64 and above are not represented).
    pub fn channel_mask(&self) -> u64 {
        self.hits
            .iter()
            .filter(|hit| hit.channel < u64::BITS)
            .fold(0, |mask, hit| mask | (1u64 << hit.channel))
    }
}

/// Static description of a detector family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectorShape {
    /// Number of indicator channels; hits on higher channels are discarded.
    pub channels: u32,
    /// Whether time over threshold is meaningful for this detector.
    pub reports_tot: bool,
    /// Clock edges between sample ingestion and indicator assertion.
    pub latency_bx: usize,
}

impl DetectorShape {
    /// Shape of a parallel level-threshold analyzer: one indicator per sample
    /// position, with time over threshold.
    pub const fn parallel(config: &ExtractorConfig) -> Self {
        Self {
            channels: config.samples_per_bx as u32,
            reports_tot: true,
            latency_bx: config.latency_bx,
        }
    }

    /// Shape of a derivative peak finder reporting up to `max_peaks` peaks per
    /// bunch crossing, without time over threshold.
    pub const fn derivative(config: &ExtractorConfig, max_peaks: u32) -> Self {
        Self {
            channels: max_peaks,
            reports_tot: false,
            latency_bx: config.latency_bx,
        }
    }

    /// Capacity of the history rings: the originating crossing plus the latency.
    pub const fn ring_depth(&self) -> usize {
        self.latency_bx + 1
    }
}

type Predicate = dyn Fn(u64) -> bool + Send + Sync;

/// Classifies an asserted-channel bitmask as an overlapping double pulse.
///
/// Classification is diagnostic only; it never changes what is emitted.
pub struct DoublePulseRule {
    predicate: Box<Predicate>,
    label: String,
}

impl DoublePulseRule {
    /// Matches exactly the listed channel bitmasks.
    pub fn from_masks(masks: impl IntoIterator<Item = u32>) -> Self {
        let masks: Vec<u64> = masks.into_iter().map(u64::from).collect();
        let label = format!("{masks:?}");
        Self {
            predicate: Box::new(move |mask| masks.contains(&mask)),
            label,
        }
    }

    /// Matches any edge with two or more asserted channels.
    pub fn multiple_channels() -> Self {
        Self {
            predicate: Box::new(|mask| mask.count_ones() >= 2),
            label: "multiple-channels".to_string(),
        }
    }

    /// Uses a caller-supplied predicate.
    pub fn custom(label: impl Into<String>, predicate: impl Fn(u64) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            label: label.into(),
        }
    }

    /// Never classifies.
    pub fn never() -> Self {
        Self {
            predicate: Box::new(|_| false),
            label: "never".to_string(),
        }
    }

    /// Returns `true` if `mask` is a double pulse.
    pub fn matches(&self, mask: u64) -> bool {
        mask != 0 && (self.predicate)(mask)
    }
}

impl fmt::Debug for DoublePulseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoublePulseRule")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl From<&ExtractorConfig> for DoublePulseRule {
    fn from(config: &ExtractorConfig) -> Self {
        Self::from_masks(config.double_pulse_masks.iter().copied())
    }
}
