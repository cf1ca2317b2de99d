//! Global Testbench Constants.
//!
//! This module defines constants shared by the bus client and the pulse pipeline. It includes:
//! 1. **Frame Constants:** Orbit length, samples per bunch crossing, raw-capture excess.
//! 2. **Bus Constants:** The acknowledge retry budget.
//! 3. **Analysis Constants:** Test-pulse window and the widest amplitude histogram.

/// Number of bunch crossings (clock edges) in one orbit.
pub const ORBIT_LENGTH: usize = 3564;

/// Number of ADC samples delivered per bunch crossing.
pub const SAMPLES_PER_BX: usize = 30;

/// Extra samples a raw capture orbit carries beyond `ORBIT_LENGTH * SAMPLES_PER_BX`.
///
/// Firmware specific; capture readers strip these before feeding the pipeline.
pub const ORBIT_EXCESS: usize = 3672;

/// Clock edges a transaction waits for acknowledge before timing out.
pub const BUS_TIMEOUT_EDGES: u32 = 10;

/// Pipeline latency in bunch crossings between sample ingestion and peak flag.
pub const PIPELINE_LATENCY_BX: usize = 4;

/// First bunch crossing of the test-pulse window.
pub const TEST_PULSE_START: usize = 248;

/// Last bunch crossing (inclusive) of the test-pulse window.
pub const TEST_PULSE_STOP: usize = 260;

/// Widest converter resolution, in bits, an amplitude histogram is built for.
pub const MAX_AMPLITUDE_BITS: u32 = 16;
