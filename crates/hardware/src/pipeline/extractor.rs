//! Streaming pulse and waveform extractor.
//!
//! This module turns a clocked stream of sample batches and peak indicators
//! into pulse and waveform records. It performs:
//! 1. **Ingestion:** Each edge's raw samples (and derived signal, if any) are appended
//!    to fixed-depth history rings before the indicators are inspected.
//! 2. **Detection:** An edge with asserted channels emits one pulse per channel and,
//!    if detection starts from the scan state, one waveform per ring.
//! 3. **Coalescing:** Assertions on immediately following edges are the same physical
//!    pulse spilling over; they emit pulses but no further waveforms.
//! 4. **Framing:** Orbit and bunch-crossing counters advance with the clock.
//!
//! Because the ring depth is the indicator latency plus one, the snapshot taken
//! on the asserting edge starts at the bunch crossing that produced the peak.

use tracing::{debug, info, warn};

use super::detector::{DetectorShape, DoublePulseRule, EdgeReport};
use super::records::{Pulse, Waveform, WaveformKind};
use super::ring::RingBuffer;
use crate::config::ExtractorConfig;
use crate::stats::ExtractorStats;

/// Coalescing state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    /// No channel asserted on the previous edge.
    Scan,
    /// A detection is in progress; follow-on assertions are coalesced.
    Tracking,
}

/// Diagnostic note for an edge whose asserted channels form a double-pulse pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoublePulseNote {
    /// Orbit of the edge.
    pub orbit: u64,
    /// Bunch crossing of the edge.
    pub bx: u32,
    /// Asserted-channel bitmask.
    pub channel_mask: u64,
}

/// Records drained from an extractor at the end of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractorOutput {
    /// Pulses in emission order.
    pub pulses: Vec<Pulse>,
    /// Waveforms in emission order.
    pub waveforms: Vec<Waveform>,
    /// Double-pulse classifications in emission order.
    pub notes: Vec<DoublePulseNote>,
    /// Run counters.
    pub stats: ExtractorStats,
}

/// Per-run pulse extraction state machine.
#[derive(Debug)]
pub struct EventExtractor {
    shape: DetectorShape,
    double_pulse: DoublePulseRule,
    orbit_length: u32,
    orbit: u64,
    bx: u32,
    state: ScanState,
    consecutive_hits: u64,
    raw_history: RingBuffer<Vec<u32>>,
    derived_history: RingBuffer<Vec<i64>>,
    pulses: Vec<Pulse>,
    waveforms: Vec<Waveform>,
    notes: Vec<DoublePulseNote>,
    stats: ExtractorStats,
}

impl EventExtractor {
    /// Creates an extractor for one run.
    ///
    /// # Arguments
    ///
    /// * `config` - Frame geometry, first orbit number and double-pulse patterns.
    /// * `shape` - Detector family: channel count, time-over-threshold support, latency.
    pub fn new(config: &ExtractorConfig, shape: DetectorShape) -> Self {
        Self::with_rule(config, shape, DoublePulseRule::from(config))
    }

    /// Creates an extractor with an explicit double-pulse classification rule.
    pub fn with_rule(config: &ExtractorConfig, shape: DetectorShape, rule: DoublePulseRule) -> Self {
        let depth = shape.ring_depth();
        Self {
            shape,
            double_pulse: rule,
            orbit_length: config.orbit_length.max(1) as u32,
            orbit: config.first_orbit,
            bx: 0,
            state: ScanState::Scan,
            consecutive_hits: 0,
            raw_history: RingBuffer::new(depth),
            derived_history: RingBuffer::new(depth),
            pulses: Vec::new(),
            waveforms: Vec::new(),
            notes: Vec::new(),
            stats: ExtractorStats::default(),
        }
    }

    /// Processes one clock edge.
    ///
    /// Samples are ingested before the report is inspected, so snapshots taken
    /// on this edge include this edge's samples as their newest entry.
    pub fn clock_edge(&mut self, samples: &[u32], report: &EdgeReport) {
        self.raw_history.append(samples.to_vec());
        if let Some(derived) = &report.derived {
            self.derived_history.append(derived.clone());
        }

        let channels = self.shape.channels;
        let discarded = report.hits.iter().filter(|hit| hit.channel >= channels).count() as u64;
        if discarded > 0 {
            warn!(
                orbit = self.orbit,
                bx = self.bx,
                discarded,
                channels,
                "peak indicator on channel outside detector shape"
            );
            self.stats.discarded_hits += discarded;
        }

        let hits: Vec<_> = report
            .hits
            .iter()
            .filter(|hit| hit.channel < channels)
            .collect();

        if hits.is_empty() {
            self.state = ScanState::Scan;
        } else {
            let mask = hits
                .iter()
                .filter(|hit| hit.channel < u64::BITS)
                .fold(0u64, |mask, hit| mask | (1 << hit.channel));
            if self.double_pulse.matches(mask) {
                info!(
                    orbit = self.orbit,
                    bx = self.bx,
                    mask = format_args!("{mask:#b}"),
                    "double pulse"
                );
                self.notes.push(DoublePulseNote {
                    orbit: self.orbit,
                    bx: self.bx,
                    channel_mask: mask,
                });
                self.stats.double_pulses += 1;
            }

            for hit in &hits {
                self.pulses.push(Pulse {
                    orbit: self.orbit,
                    bx: self.bx,
                    amplitude: hit.amplitude,
                    position: hit.position,
                    tot: if self.shape.reports_tot { hit.tot } else { None },
                });
            }
            self.stats.pulses += hits.len() as u64;

            match self.state {
                ScanState::Scan => {
                    self.stats.detections += 1;
                    self.capture_waveforms(report.derived.is_some());
                    self.state = ScanState::Tracking;
                }
                ScanState::Tracking => {
                    self.consecutive_hits += hits.len() as u64;
                    self.stats.consecutive_pulses += hits.len() as u64;
                }
            }
        }

        self.stats.edges += 1;
        self.bx += 1;
        if self.bx >= self.orbit_length {
            self.complete_orbit();
        }
    }

    /// Clocks up to one orbit of edges and closes the orbit.
    ///
    /// Edges beyond the remaining length of the current orbit are not
    /// consumed. A batch shorter than the orbit ends it early.
    ///
    /// # Returns
    ///
    /// The number of edges consumed.
    pub fn process_frame<I, S>(&mut self, edges: I) -> usize
    where
        I: IntoIterator<Item = (S, EdgeReport)>,
        S: AsRef<[u32]>,
    {
        let remaining = (self.orbit_length - self.bx) as usize;
        let mut consumed = 0;
        for (samples, report) in edges.into_iter().take(remaining) {
            self.clock_edge(samples.as_ref(), &report);
            consumed += 1;
        }
        self.finish_frame();
        consumed
    }

    /// Ends the current orbit early if any edge of it has been clocked.
    pub fn finish_frame(&mut self) {
        if self.bx > 0 {
            debug!(
                orbit = self.orbit,
                edges = self.bx,
                expected = self.orbit_length,
                "short orbit"
            );
            self.stats.short_orbits += 1;
            self.complete_orbit();
        }
    }

    /// Current orbit number.
    pub const fn orbit(&self) -> u64 {
        self.orbit
    }

    /// Bunch crossing the next edge will be attributed to.
    pub const fn bx(&self) -> u32 {
        self.bx
    }

    /// Current coalescing state.
    pub const fn state(&self) -> ScanState {
        self.state
    }

    /// Follow-on pulses coalesced into earlier detections.
    pub const fn consecutive_hits(&self) -> u64 {
        self.consecutive_hits
    }

    /// Detector shape the extractor was built for.
    pub const fn shape(&self) -> &DetectorShape {
        &self.shape
    }

    /// Pulses emitted so far.
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    /// Waveforms emitted so far.
    pub fn waveforms(&self) -> &[Waveform] {
        &self.waveforms
    }

    /// Double-pulse notes raised so far.
    pub fn notes(&self) -> &[DoublePulseNote] {
        &self.notes
    }

    /// Run counters.
    pub const fn stats(&self) -> &ExtractorStats {
        &self.stats
    }

    /// Takes the accumulated records, leaving the counters and history in place.
    pub fn drain(&mut self) -> ExtractorOutput {
        ExtractorOutput {
            pulses: std::mem::take(&mut self.pulses),
            waveforms: std::mem::take(&mut self.waveforms),
            notes: std::mem::take(&mut self.notes),
            stats: self.stats,
        }
    }

    /// Consumes the extractor and returns every record.
    pub fn finish(mut self) -> ExtractorOutput {
        self.finish_frame();
        info!(
            orbits = self.stats.orbits,
            pulses = self.stats.pulses,
            consecutive = self.stats.consecutive_pulses,
            waveforms = self.stats.waveforms,
            "extraction finished"
        );
        self.drain()
    }

    fn capture_waveforms(&mut self, with_derived: bool) {
        let raw = self
            .raw_history
            .iter()
            .flat_map(|bx| bx.iter().map(|&s| i64::from(s)))
            .collect();
        self.waveforms.push(Waveform {
            orbit: self.orbit,
            bx: self.bx,
            kind: WaveformKind::Raw,
            samples: raw,
        });
        self.stats.waveforms += 1;

        if with_derived {
            let derived = self.derived_history.iter().flatten().copied().collect();
            self.waveforms.push(Waveform {
                orbit: self.orbit,
                bx: self.bx,
                kind: WaveformKind::Derived,
                samples: derived,
            });
            self.stats.waveforms += 1;
        }
    }

    fn complete_orbit(&mut self) {
        debug!(
            orbit = self.orbit,
            pulses = self.stats.pulses,
            "orbit complete"
        );
        self.stats.orbits += 1;
        self.orbit += 1;
        self.bx = 0;
    }
}
