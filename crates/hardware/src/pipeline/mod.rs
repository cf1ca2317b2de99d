//! Pulse extraction pipeline.
//!
//! This module organizes the components that turn clocked sample batches and
//! peak indicators into pulse and waveform records: the history rings, the
//! detector interface, the coalescing extractor, and the record formats.

/// Detector per-edge report, shape and double-pulse classification.
pub mod detector;

/// Coalescing pulse and waveform extractor.
pub mod extractor;

/// Pulse and waveform records and their delimited text form.
pub mod records;

/// Fixed-capacity circular history buffer.
pub mod ring;

pub use detector::{DetectorShape, DoublePulseRule, EdgeReport, PeakHit};
pub use extractor::{DoublePulseNote, EventExtractor, ExtractorOutput, ScanState};
pub use records::{Pulse, Waveform, WaveformKind};
pub use ring::RingBuffer;
