//! Masked register bus client.
//!
//! This module implements read and read-modify-write transactions over a
//! [`BusPort`]. It provides:
//! 1. **Symbolic Access:** Registers are addressed by name through a [`RegisterMap`].
//! 2. **Field Masking:** Reads decode the field; writes to sub-fields preserve sibling bits.
//! 3. **Bounded Waits:** Acknowledge is polled for a fixed number of edges, then the
//!    transaction is abandoned and the bus returned to idle.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::common::constants::BUS_TIMEOUT_EDGES;
use crate::common::error::{BusError, BusOp};
use crate::common::field;
use crate::config::BusConfig;
use crate::soc::registers::{Register, RegisterMap};
use crate::soc::signals::{BusLines, BusPort};

/// Register client bound to one bus port.
///
/// Transactions are strictly sequential: each one either completes or times
/// out, leaving the lines idle, before the next begins.
#[derive(Debug)]
pub struct BusClient<P> {
    port: P,
    map: Arc<RegisterMap>,
    timeout_edges: u32,
}

impl<P: BusPort> BusClient<P> {
    /// Creates a client with the default retry budget.
    pub const fn new(port: P, map: Arc<RegisterMap>) -> Self {
        Self {
            port,
            map,
            timeout_edges: BUS_TIMEOUT_EDGES,
        }
    }

    /// Creates a client using the retry budget from `config`.
    pub fn with_config(port: P, map: Arc<RegisterMap>, config: &BusConfig) -> Self {
        Self {
            port,
            map,
            timeout_edges: config.timeout_edges,
        }
    }

    /// Sets the number of edges to wait for acknowledge.
    #[must_use]
    pub fn with_timeout(mut self, edges: u32) -> Self {
        self.timeout_edges = edges;
        self
    }

    /// Reads the field of register `name`, shifted down to bit zero.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::UnknownRegister`] if `name` is not mapped and
    /// [`BusError::Timeout`] if the peripheral never acknowledges.
    pub fn read(&mut self, name: &str) -> Result<u32, BusError> {
        self.read_with(name, true)
    }

    /// Reads the whole word holding register `name`, without masking.
    ///
    /// # Errors
    ///
    /// As [`BusClient::read`].
    pub fn read_raw(&mut self, name: &str) -> Result<u32, BusError> {
        self.read_with(name, false)
    }

    /// Reads register `name`, decoding the field when `apply_mask` is set.
    ///
    /// # Errors
    ///
    /// As [`BusClient::read`].
    pub fn read_with(&mut self, name: &str, apply_mask: bool) -> Result<u32, BusError> {
        let reg = self
            .map
            .resolve(name)
            .map_err(|err| err.during(BusOp::Read))?;
        self.read_register(name, reg, apply_mask)
    }

    /// Writes `value` into the field of register `name`.
    ///
    /// When the field is narrower than the word the current word is read
    /// first and the bits outside the mask are written back unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::UnknownRegister`] if `name` is not mapped and
    /// [`BusError::Timeout`] if either the preliminary read or the write is
    /// not acknowledged.
    pub fn write(&mut self, name: &str, value: u32) -> Result<(), BusError> {
        let reg = self
            .map
            .resolve(name)
            .map_err(|err| err.during(BusOp::Write))?;
        if !field::fits(reg.mask, value) {
            warn!(
                register = name,
                value = format_args!("{value:#x}"),
                mask = format_args!("{:#010x}", reg.mask),
                "value wider than register field, truncating"
            );
        }
        let encoded = field::encode(reg.mask, value)?;

        let word = if reg.is_subfield() {
            let current = self.read_register(name, reg, false)?;
            (current & !reg.mask) | encoded
        } else {
            encoded
        };

        let _ = self.transact(name, BusOp::Write, BusLines::write(reg.address, word))?;
        debug!(
            register = name,
            address = format_args!("{:#x}", reg.address),
            word = format_args!("{word:#010x}"),
            "bus write"
        );
        Ok(())
    }

    /// Writes each `(name, value)` pair in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// As [`BusClient::write`].
    pub fn write_all<'a, I>(&mut self, settings: I) -> Result<(), BusError>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        for (name, value) in settings {
            self.write(name, value)?;
        }
        Ok(())
    }

    /// Returns the register map used for name resolution.
    pub fn register_map(&self) -> &RegisterMap {
        &self.map
    }

    /// Number of edges a transaction waits for acknowledge.
    pub const fn timeout_edges(&self) -> u32 {
        self.timeout_edges
    }

    /// Returns the underlying port.
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// Returns the underlying port mutably.
    pub const fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Consumes the client and returns the port.
    pub fn into_inner(self) -> P {
        self.port
    }

    fn read_register(&mut self, name: &str, reg: Register, apply_mask: bool) -> Result<u32, BusError> {
        let raw = self.transact(name, BusOp::Read, BusLines::read(reg.address))?;
        let value = if apply_mask {
            field::decode(reg.mask, raw)?
        } else {
            raw
        };
        debug!(
            register = name,
            address = format_args!("{:#x}", reg.address),
            raw = format_args!("{raw:#010x}"),
            value,
            "bus read"
        );
        Ok(value)
    }

    /// Runs one handshake and returns the read data sampled with acknowledge.
    ///
    /// Read data is resampled on every edge while waiting; only the value on
    /// the acknowledging edge is returned. The lines are idle on return,
    /// whether or not the peripheral answered.
    fn transact(&mut self, name: &str, op: BusOp, lines: BusLines) -> Result<u32, BusError> {
        self.port.clock_edge();
        self.port.drive(lines);

        let mut sampled = 0;
        for _ in 0..self.timeout_edges {
            self.port.clock_edge();
            sampled = self.port.data_out();
            if self.port.ack() {
                self.port.drive(BusLines::IDLE);
                return Ok(sampled);
            }
        }

        self.port.drive(BusLines::IDLE);
        warn!(
            register = name,
            %op,
            edges = self.timeout_edges,
            last_data = format_args!("{sampled:#010x}"),
            "bus transaction timed out"
        );
        Err(BusError::Timeout {
            register: name.to_string(),
            op,
            edges: self.timeout_edges,
        })
    }
}
