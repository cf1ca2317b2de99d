//! Software peak finder models.
//!
//! Behavioural stand-ins for the two firmware peak finder families, producing
//! the same per-edge reports the hardware presents. It provides:
//! 1. **Threshold Detector:** Level threshold with a minimum time over threshold;
//!    one indicator per sample position.
//! 2. **Derivative Detector:** Derivative sign change above a slope and value threshold;
//!    up to a fixed number of peaks per bunch crossing, with the derivative as derived signal.
//!
//! Both models report on the edge that carries the samples, so they pair
//! with an extractor built for zero latency.

use tracing::trace;

use crate::config::ExtractorConfig;
use crate::dsp;
use crate::pipeline::detector::{DetectorShape, EdgeReport, PeakHit};

/// Source of per-edge peak indicator reports.
pub trait PeakSource {
    /// Shape of the detector for an extractor built from `config`.
    fn shape(&self, config: &ExtractorConfig) -> DetectorShape;

    /// Inspects one bunch crossing of samples and reports asserted peaks.
    fn inspect(&mut self, samples: &[u32]) -> EdgeReport;
}

impl<P: PeakSource + ?Sized> PeakSource for &mut P {
    fn shape(&self, config: &ExtractorConfig) -> DetectorShape {
        (**self).shape(config)
    }

    fn inspect(&mut self, samples: &[u32]) -> EdgeReport {
        (**self).inspect(samples)
    }
}

/// Parallel analyzer model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdDetector {
    /// Samples strictly above this value count as over threshold.
    pub level_threshold: u32,
    /// Minimum run of over-threshold samples for a peak.
    pub tot_threshold: u32,
}

impl ThresholdDetector {
    /// Creates a detector with the given thresholds.
    pub const fn new(level_threshold: u32, tot_threshold: u32) -> Self {
        Self {
            level_threshold,
            tot_threshold,
        }
    }
}

impl Default for ThresholdDetector {
    fn default() -> Self {
        Self::new(130, 3)
    }
}

impl PeakSource for ThresholdDetector {
    fn shape(&self, config: &ExtractorConfig) -> DetectorShape {
        DetectorShape {
            latency_bx: 0,
            ..DetectorShape::parallel(config)
        }
    }

    /// Reports the maximum of the longest over-threshold run.
    fn inspect(&mut self, samples: &[u32]) -> EdgeReport {
        let mut best: Option<(usize, usize)> = None;
        let mut run_start = None;
        for (i, &s) in samples.iter().enumerate() {
            if s > self.level_threshold {
                let start = *run_start.get_or_insert(i);
                let len = i + 1 - start;
                if best.is_none_or(|(_, best_len)| len > best_len) {
                    best = Some((start, len));
                }
            } else {
                run_start = None;
            }
        }

        let Some((start, len)) = best else {
            return EdgeReport::quiet();
        };
        if (len as u32) < self.tot_threshold {
            return EdgeReport::quiet();
        }

        let run = &samples[start..start + len];
        let (offset, &amplitude) = run
            .iter()
            .enumerate()
            .fold((0, &run[0]), |best, (i, s)| if *s > *best.1 { (i, s) } else { best });
        let position = (start + offset) as u32;
        trace!(position, amplitude, tot = len, "threshold peak");
        EdgeReport::with_hits(vec![PeakHit {
            channel: position,
            amplitude: i64::from(amplitude),
            position,
            tot: Some(len as u32),
        }])
    }
}

/// Derivative peak finder model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivativeDetector {
    /// Minimum derivative on the sample before the peak.
    pub deriv_threshold: i64,
    /// Minimum sample value at the peak.
    pub value_threshold: u32,
    /// Maximum peaks reported per bunch crossing.
    pub max_peaks: u32,
    /// Derivative window (5, 7 or 9).
    pub window: usize,
}

impl Default for DerivativeDetector {
    fn default() -> Self {
        Self {
            deriv_threshold: 15,
            value_threshold: 40,
            max_peaks: 3,
            window: 7,
        }
    }
}

impl PeakSource for DerivativeDetector {
    fn shape(&self, config: &ExtractorConfig) -> DetectorShape {
        DetectorShape {
            latency_bx: 0,
            ..DetectorShape::derivative(config, self.max_peaks)
        }
    }

    /// Reports samples where the derivative falls from above the slope
    /// threshold to zero or below.
    fn inspect(&mut self, samples: &[u32]) -> EdgeReport {
        let derivative = match dsp::snrd_u32(samples, self.window) {
            Ok(d) => d,
            Err(err) => {
                trace!(%err, "bunch crossing too short for derivative");
                return EdgeReport::quiet();
            }
        };

        let hits = (1..samples.len())
            .filter(|&i| {
                derivative[i - 1] >= self.deriv_threshold
                    && derivative[i] <= 0
                    && samples[i] >= self.value_threshold
            })
            .take(self.max_peaks as usize)
            .enumerate()
            .map(|(ordinal, i)| PeakHit {
                channel: ordinal as u32,
                amplitude: i64::from(samples[i]),
                position: i as u32,
                tot: None,
            })
            .collect();

        EdgeReport::with_hits(hits).with_derived(derivative)
    }
}
