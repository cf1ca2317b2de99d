//! Error definitions for the register bus and the pulse pipeline.
//!
//! This module defines the failure taxonomy of the crate. It provides:
//! 1. **Bus Errors:** Unknown registers, malformed masks and acknowledge timeouts.
//! 2. **Configuration Errors:** JSON, I/O and register-table validation failures.
//! 3. **Record Errors:** Malformed delimited pulse and waveform records.
//! 4. **Derivative Errors:** Unsupported SNRD windows and short inputs.
//!
//! Extractor-side conditions (short frames, frames without detections) are not
//! errors and have no variant here.

use std::fmt;

use thiserror::Error;

/// Kind of bus transaction, carried in errors for context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusOp {
    /// Read transaction (strobe=1, write=0).
    Read,
    /// Write transaction (strobe=1, write=1).
    Write,
}

impl fmt::Display for BusOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Failures raised by register resolution, bit-field helpers and bus transactions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BusError {
    /// The symbolic register name is not present in the register map.
    ///
    /// Caller or configuration error; never retried.
    #[error("unknown register `{name}`{}", .op.map_or_else(String::new, |op| format!(" on {op}")))]
    UnknownRegister {
        /// Name that failed to resolve.
        name: String,
        /// Transaction that needed the register; `None` for a bare map lookup.
        op: Option<BusOp>,
    },

    /// The mask is zero or not a single contiguous run of set bits.
    #[error("invalid register mask {mask:#010x}")]
    InvalidMask {
        /// Offending mask.
        mask: u32,
    },

    /// The peripheral did not assert acknowledge within the retry budget.
    ///
    /// The transaction is aborted and the bus is left idle before this is returned.
    #[error("bus {op} of register `{register}` timed out after {edges} clock edges")]
    Timeout {
        /// Register being accessed.
        register: String,
        /// Transaction kind.
        op: BusOp,
        /// Number of edges waited for acknowledge.
        edges: u32,
    },
}

impl BusError {
    /// Attributes an unknown-register failure to the transaction that hit it.
    #[must_use]
    pub fn during(self, op: BusOp) -> Self {
        match self {
            Self::UnknownRegister { name, .. } => Self::UnknownRegister { name, op: Some(op) },
            other => other,
        }
    }
}

/// Failures while loading or validating a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration text is not valid JSON for the schema.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The register table contains an invalid entry.
    #[error("register `{name}`: {source}")]
    Register {
        /// Register whose entry was rejected.
        name: String,
        /// Underlying validation failure.
        source: BusError,
    },

    /// An extractor parameter is out of range.
    #[error("invalid extractor setting `{field}`: {reason}")]
    Extractor {
        /// Name of the setting.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Failures while parsing a persisted pulse or waveform record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The line has fewer fields than the record shape requires.
    #[error("line {line}: expected at least {expected} fields, found {found}")]
    FieldCount {
        /// 1-based line number (0 when parsing a lone record).
        line: usize,
        /// Minimum field count.
        expected: usize,
        /// Fields present.
        found: usize,
    },

    /// A numeric field failed to parse.
    #[error("line {line}: field `{field}` is not an integer: `{value}`")]
    Integer {
        /// 1-based line number (0 when parsing a lone record).
        line: usize,
        /// Field name.
        field: &'static str,
        /// Raw text of the field.
        value: String,
    },

    /// The waveform kind tag is not recognized.
    #[error("line {line}: unknown waveform kind `{kind}`")]
    UnknownKind {
        /// 1-based line number (0 when parsing a lone record).
        line: usize,
        /// Raw kind tag.
        kind: String,
    },

    /// Reading or writing the record stream failed.
    #[error("record stream I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl RecordError {
    /// Returns the same error attributed to the given 1-based line number.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Self::FieldCount {
                expected, found, ..
            } => Self::FieldCount {
                line,
                expected,
                found,
            },
            Self::Integer { field, value, .. } => Self::Integer { line, field, value },
            Self::UnknownKind { kind, .. } => Self::UnknownKind { line, kind },
            Self::Io(err) => Self::Io(err),
        }
    }
}

/// Failures of the smooth noise-robust derivative.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DerivativeError {
    /// Only windows of 5, 7 and 9 samples have coefficient sets.
    #[error("unsupported derivative window {0}, expected one of 5, 7, 9")]
    UnsupportedWindow(usize),

    /// The input is shorter than the window.
    #[error("derivative window needs {needed} samples, got {got}")]
    NotEnoughSamples {
        /// Window size.
        needed: usize,
        /// Input length.
        got: usize,
    },
}
