//! Pulse histograms.
//!
//! This module bins extracted pulses for offline inspection. It provides:
//! 1. **Occupancy:** Pulses per bunch crossing across the orbit.
//! 2. **Amplitude:** Pulses per amplitude code for an `nbit` ADC.
//! 3. **Position:** Pulses per sample index within the bunch crossing.
//!
//! Every histogram can exclude the test-pulse window, the bunch crossings
//! where the calibration pulse is injected.

use std::ops::RangeInclusive;

use tracing::warn;

use crate::common::constants::MAX_AMPLITUDE_BITS;
use crate::config::AnalysisConfig;
use crate::pipeline::records::Pulse;

/// Fixed-size histogram with an overflow counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    bins: Vec<u64>,
    overflow: u64,
}

impl Histogram {
    /// Creates a histogram with `size` empty bins.
    pub fn new(size: usize) -> Self {
        Self {
            bins: vec![0; size],
            overflow: 0,
        }
    }

    /// Counts one entry; out-of-range values go to the overflow counter.
    pub fn fill(&mut self, value: i64) {
        match usize::try_from(value).ok().and_then(|idx| self.bins.get_mut(idx)) {
            Some(bin) => *bin += 1,
            None => self.overflow += 1,
        }
    }

    /// Bin contents.
    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// Entries that fell outside the bins.
    pub const fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Entries counted in bins.
    pub fn entries(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Index and content of the fullest bin, lowest index on ties.
    pub fn peak(&self) -> Option<(usize, u64)> {
        self.bins
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .fold(None, |best, (idx, count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((idx, count)),
            })
    }
}

/// Bunch crossings excluded from histograms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestPulseWindow(RangeInclusive<u32>);

impl TestPulseWindow {
    /// Window covering `start..=stop`.
    pub const fn new(start: u32, stop: u32) -> Self {
        Self(start..=stop)
    }

    /// Returns `true` if `pulse` lies inside the window.
    pub fn contains(&self, pulse: &Pulse) -> bool {
        self.0.contains(&pulse.bx)
    }
}

impl From<&AnalysisConfig> for TestPulseWindow {
    fn from(config: &AnalysisConfig) -> Self {
        let start = u32::try_from(config.test_pulse_start).unwrap_or(u32::MAX);
        let stop = u32::try_from(config.test_pulse_stop).unwrap_or(u32::MAX);
        Self::new(start, stop)
    }
}

fn histogram<'a, I, F>(pulses: I, size: usize, exclude: Option<&TestPulseWindow>, key: F) -> Histogram
where
    I: IntoIterator<Item = &'a Pulse>,
    F: Fn(&Pulse) -> i64,
{
    let mut hist = Histogram::new(size);
    for pulse in pulses {
        if exclude.is_some_and(|window| window.contains(pulse)) {
            continue;
        }
        hist.fill(key(pulse));
    }
    hist
}

/// Pulses per bunch crossing.
pub fn occupancy<'a>(
    pulses: impl IntoIterator<Item = &'a Pulse>,
    orbit_length: usize,
    exclude: Option<&TestPulseWindow>,
) -> Histogram {
    histogram(pulses, orbit_length, exclude, |p| i64::from(p.bx))
}

/// Pulses per amplitude code of an `nbit` converter.
///
/// `nbit` is capped at [`MAX_AMPLITUDE_BITS`]; codes above the cap overflow.
pub fn amplitude<'a>(
    pulses: impl IntoIterator<Item = &'a Pulse>,
    nbit: u32,
    exclude: Option<&TestPulseWindow>,
) -> Histogram {
    let bits = nbit.min(MAX_AMPLITUDE_BITS);
    if bits < nbit {
        warn!(nbit, cap = MAX_AMPLITUDE_BITS, "amplitude resolution capped");
    }
    histogram(pulses, 1 << bits, exclude, |p| p.amplitude)
}

/// Pulses per sample index within the bunch crossing.
pub fn position<'a>(
    pulses: impl IntoIterator<Item = &'a Pulse>,
    samples_per_bx: usize,
    exclude: Option<&TestPulseWindow>,
) -> Histogram {
    histogram(pulses, samples_per_bx, exclude, |p| i64::from(p.position))
}
