//! Common utilities and types used throughout the testbench core.
//!
//! This module provides building blocks shared by the bus client and the pulse
//! pipeline. It includes:
//! 1. **Constants:** Frame geometry, register width and bus retry budget.
//! 2. **Bit Fields:** Mask shift, encode and decode helpers.
//! 3. **Error Handling:** Bus, configuration, record and derivative errors.

/// Common constants used throughout the crate.
pub mod constants;

/// Error types.
pub mod error;

/// Masked bit-field helpers.
pub mod field;

pub use error::{BusError, BusOp, ConfigError, DerivativeError, RecordError};
pub use field::{FULL_WORD, decode, encode, shift_for};
