//! Configuration system for the testbench core.
//!
//! This module defines the configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** Baseline frame geometry, pipeline latency and bus retry budget.
//! 2. **Structures:** Extractor, bus, register table and analysis settings.
//! 3. **Loading:** JSON parsing from text or file, and register map construction.
//!
//! Every field has a default, so an empty JSON object is a valid configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::constants;
use crate::common::error::ConfigError;
use crate::soc::registers::{Register, RegisterMap};

/// Default configuration constants.
mod defaults {
    use crate::common::constants;

    /// Samples per bunch crossing.
    pub const SAMPLES_PER_BX: usize = constants::SAMPLES_PER_BX;

    /// Bunch crossings per orbit.
    pub const ORBIT_LENGTH: usize = constants::ORBIT_LENGTH;

    /// Peak flag latency in bunch crossings.
    pub const LATENCY_BX: usize = constants::PIPELINE_LATENCY_BX;

    /// Orbit number given to the first frame of a run.
    ///
    /// Capture readers number orbits from one as they are read.
    pub const FIRST_ORBIT: u64 = 1;

    /// Asserted-channel patterns classified as a double pulse.
    ///
    /// Any two or all three of the low three channels.
    pub const DOUBLE_PULSE_MASKS: [u32; 4] = [0b011, 0b101, 0b110, 0b111];

    /// Acknowledge retry budget in clock edges.
    pub const TIMEOUT_EDGES: u32 = constants::BUS_TIMEOUT_EDGES;
}

/// Root configuration type.
///
/// # Examples
///
/// ```
/// use peakbench_core::config::Config;
///
/// let json = r#"{
///     "extractor": { "samples_per_bx": 8, "latency_bx": 2 },
///     "bus": { "timeout_edges": 4 },
///     "registers": {
///         "level_threshold": { "address": 2, "mask": 4095 },
///         "enable": { "address": 0 }
///     }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.extractor.samples_per_bx, 8);
/// assert_eq!(config.extractor.orbit_length, 3564);
/// assert_eq!(config.bus.timeout_edges, 4);
///
/// let map = config.register_map().unwrap();
/// assert_eq!(map.resolve("level_threshold").unwrap().mask, 0xFFF);
/// assert_eq!(map.resolve("enable").unwrap().mask, u32::MAX);
/// assert_eq!(config.setup_writes().collect::<Vec<_>>(), [("level_threshold", 130)]);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Pulse extractor settings
    #[serde(default)]
    pub extractor: ExtractorConfig,
    /// Register bus client settings
    #[serde(default)]
    pub bus: BusConfig,
    /// Symbolic register table (name to address and mask)
    #[serde(default)]
    pub registers: BTreeMap<String, RegisterConfig>,
    /// Register values written at setup, in name order
    #[serde(default)]
    pub settings: BTreeMap<String, u32>,
    /// Histogram settings
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Parses a configuration from JSON text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input and
    /// [`ConfigError::Extractor`] if an extractor setting is out of range.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.extractor.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Builds the register map from the register table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Register`] naming the first entry whose mask is
    /// zero or not contiguous.
    pub fn register_map(&self) -> Result<RegisterMap, ConfigError> {
        let mut map = RegisterMap::new();
        for (name, entry) in &self.registers {
            let _ = map
                .insert(name.clone(), Register::new(entry.address, entry.mask))
                .map_err(|source| ConfigError::Register {
                    name: name.clone(),
                    source,
                })?;
        }
        Ok(map)
    }

    /// Setup writes as `(register, value)` pairs.
    pub fn setup_writes(&self) -> impl Iterator<Item = (&str, u32)> {
        self.settings.iter().map(|(name, &value)| (name.as_str(), value))
    }
}

/// Pulse extractor configuration.
///
/// Describes frame geometry and the detector shape the extractor is
/// parameterized by.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// Samples per bunch crossing (one raw vector per clock edge)
    #[serde(default = "ExtractorConfig::default_samples_per_bx")]
    pub samples_per_bx: usize,

    /// Bunch crossings per orbit (frame length in clock edges)
    #[serde(default = "ExtractorConfig::default_orbit_length")]
    pub orbit_length: usize,

    /// Clock edges between sample ingestion and peak flag assertion
    #[serde(default = "ExtractorConfig::default_latency_bx")]
    pub latency_bx: usize,

    /// Asserted-channel bitmasks classified as a double pulse
    #[serde(default = "ExtractorConfig::default_double_pulse_masks")]
    pub double_pulse_masks: Vec<u32>,

    /// Orbit number of the first frame
    #[serde(default = "ExtractorConfig::default_first_orbit")]
    pub first_orbit: u64,
}

impl ExtractorConfig {
    /// Returns the default number of samples per bunch crossing.
    fn default_samples_per_bx() -> usize {
        defaults::SAMPLES_PER_BX
    }

    /// Returns the default orbit length.
    fn default_orbit_length() -> usize {
        defaults::ORBIT_LENGTH
    }

    /// Returns the default peak flag latency.
    fn default_latency_bx() -> usize {
        defaults::LATENCY_BX
    }

    /// Returns the default double-pulse patterns.
    fn default_double_pulse_masks() -> Vec<u32> {
        defaults::DOUBLE_PULSE_MASKS.to_vec()
    }

    /// Returns the default first orbit number.
    fn default_first_orbit() -> u64 {
        defaults::FIRST_ORBIT
    }

    /// Capacity of the waveform history rings.
    ///
    /// Holds the bunch crossing that produced the peak plus every crossing
    /// clocked in while the flag propagated.
    pub const fn ring_depth(&self) -> usize {
        self.latency_bx + 1
    }

    /// Checks that frame geometry is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Extractor`] if `samples_per_bx` or
    /// `orbit_length` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_bx == 0 {
            return Err(ConfigError::Extractor {
                field: "samples_per_bx",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.orbit_length == 0 {
            return Err(ConfigError::Extractor {
                field: "orbit_length",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            samples_per_bx: defaults::SAMPLES_PER_BX,
            orbit_length: defaults::ORBIT_LENGTH,
            latency_bx: defaults::LATENCY_BX,
            double_pulse_masks: defaults::DOUBLE_PULSE_MASKS.to_vec(),
            first_orbit: defaults::FIRST_ORBIT,
        }
    }
}

/// Register bus client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Clock edges to wait for acknowledge before a transaction times out
    #[serde(default = "BusConfig::default_timeout_edges")]
    pub timeout_edges: u32,
}

impl BusConfig {
    /// Returns the default acknowledge retry budget.
    fn default_timeout_edges() -> u32 {
        defaults::TIMEOUT_EDGES
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            timeout_edges: defaults::TIMEOUT_EDGES,
        }
    }
}

/// One register table entry.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RegisterConfig {
    /// Word address on the bus
    pub address: u32,
    /// Field mask within the word (whole word when omitted)
    #[serde(default = "RegisterConfig::default_mask")]
    pub mask: u32,
}

impl RegisterConfig {
    /// Returns the whole-word mask.
    fn default_mask() -> u32 {
        crate::common::field::FULL_WORD
    }
}

/// Histogram configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AnalysisConfig {
    /// First bunch crossing of the test-pulse window
    #[serde(default = "AnalysisConfig::default_test_pulse_start")]
    pub test_pulse_start: usize,
    /// Last bunch crossing (inclusive) of the test-pulse window
    #[serde(default = "AnalysisConfig::default_test_pulse_stop")]
    pub test_pulse_stop: usize,
}

impl AnalysisConfig {
    /// Returns the default start of the test-pulse window.
    fn default_test_pulse_start() -> usize {
        constants::TEST_PULSE_START
    }

    /// Returns the default end of the test-pulse window.
    fn default_test_pulse_stop() -> usize {
        constants::TEST_PULSE_STOP
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            test_pulse_start: constants::TEST_PULSE_START,
            test_pulse_stop: constants::TEST_PULSE_STOP,
        }
    }
}
