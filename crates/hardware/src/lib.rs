//! Peak finder testbench core.
//!
//! This crate implements the host side of a firmware peak finder testbench with the following:
//! 1. **Bus:** Symbolic, masked register access over a clocked strobe/acknowledge handshake.
//! 2. **Pipeline:** Latency-aligned history rings and a coalescing pulse and waveform extractor.
//! 3. **Models:** Software threshold and derivative peak finders, plus a frame driver.
//! 4. **Analysis:** Derivative filter, pulse histograms, record files and run statistics.

/// Pulse histograms with test-pulse exclusion.
pub mod analysis;
/// Common types and constants (bit fields, errors, frame geometry).
pub mod common;
/// Testbench configuration (defaults, JSON loading, register table).
pub mod config;
/// Smooth noise-robust differentiator.
pub mod dsp;
/// Pulse extraction pipeline (rings, detector interface, extractor, records).
pub mod pipeline;
/// Software peak finder models and frame driver.
pub mod sim;
/// Register bus (map, signals, client, simulated interconnect, devices).
pub mod soc;
/// Extraction run statistics.
pub mod stats;

/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Streaming extractor; construct with `EventExtractor::new`.
pub use crate::pipeline::EventExtractor;
/// Masked register client over any [`soc::BusPort`].
pub use crate::soc::BusClient;
/// Simulated handshake bus for driving the client without hardware.
pub use crate::soc::HandshakeBus;
/// Symbolic register table.
pub use crate::soc::RegisterMap;
