//! Handshake bus signals.
//!
//! The register client talks to a peripheral through four request lines
//! (strobe, write, address, data) and two response lines (acknowledge and read
//! data), all sampled on a clock. [`BusPort`] is the seam between the client
//! and whatever owns those lines: a simulator, a hardware bridge, or a test stub.

/// Request lines driven by the bus master.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusLines {
    /// Transaction request.
    pub strobe: bool,
    /// Write enable (read when low).
    pub write: bool,
    /// Word address.
    pub address: u32,
    /// Write data (zero on reads).
    pub data: u32,
}

impl BusLines {
    /// All lines deasserted.
    pub const IDLE: Self = Self {
        strobe: false,
        write: false,
        address: 0,
        data: 0,
    };

    /// Lines for a read request at `address`.
    pub const fn read(address: u32) -> Self {
        Self {
            strobe: true,
            write: false,
            address,
            data: 0,
        }
    }

    /// Lines for a write of `data` to `address`.
    pub const fn write(address: u32, data: u32) -> Self {
        Self {
            strobe: true,
            write: true,
            address,
            data,
        }
    }

    /// Returns `true` if every line is deasserted.
    pub fn is_idle(&self) -> bool {
        *self == Self::IDLE
    }
}

/// Clocked access to the handshake lines.
///
/// Implementors own the lines for the duration of a transaction. Driven values
/// take effect on the next clock edge; sampled values reflect the most recent
/// edge.
pub trait BusPort {
    /// Advances to the next rising clock edge.
    fn clock_edge(&mut self);

    /// Drives the request lines.
    fn drive(&mut self, lines: BusLines);

    /// Samples the acknowledge line.
    fn ack(&self) -> bool;

    /// Samples the peripheral's read data.
    fn data_out(&self) -> u32;
}

impl<P: BusPort + ?Sized> BusPort for &mut P {
    fn clock_edge(&mut self) {
        (**self).clock_edge();
    }

    fn drive(&mut self, lines: BusLines) {
        (**self).drive(lines);
    }

    fn ack(&self) -> bool {
        (**self).ack()
    }

    fn data_out(&self) -> u32 {
        (**self).data_out()
    }
}
