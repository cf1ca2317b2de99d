//! Simulated handshake bus.
//!
//! This module implements a clocked bus that answers the register client's
//! handshake. It provides:
//! 1. **Device registration:** Devices are added by word address range and sorted for lookup.
//! 2. **Handshake:** A strobed request is served after a configurable number of edges,
//!    or never, and acknowledged for exactly one edge.
//! 3. **Observation:** Edge counters and a log of completed transactions for test harnesses.

use tracing::trace;

use super::devices::Device;
use super::signals::{BusLines, BusPort};
use crate::common::error::BusOp;

/// One completed bus transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusTransaction {
    /// Read or write.
    pub op: BusOp,
    /// Word address.
    pub address: u32,
    /// Word written, or word returned by the read.
    pub data: u32,
}

/// Clocked bus routing strobed requests to devices by word address.
///
/// Requests to addresses no device claims are still acknowledged; reads return
/// zero and writes are dropped.
pub struct HandshakeBus {
    /// Registered devices, sorted by base address.
    devices: Vec<Box<dyn Device + Send + Sync>>,
    /// Edges between a request being seen and acknowledge; `None` never acknowledges.
    ack_latency: Option<u32>,
    lines: BusLines,
    ack: bool,
    data_out: u32,
    wait: u32,
    served: bool,
    edges: u64,
    strobed_edges: u64,
    transactions: Vec<BusTransaction>,
    last_device_idx: usize,
}

impl std::fmt::Debug for HandshakeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandshakeBus")
            .field("devices", &self.devices.iter().map(|d| d.name()).collect::<Vec<_>>())
            .field("ack_latency", &self.ack_latency)
            .field("lines", &self.lines)
            .field("ack", &self.ack)
            .field("edges", &self.edges)
            .finish_non_exhaustive()
    }
}

impl HandshakeBus {
    /// Creates a bus that acknowledges a request `ack_latency` edges after it is seen.
    ///
    /// A latency of zero behaves like one: the earliest acknowledge is on the
    /// first edge that samples the strobe.
    pub const fn new(ack_latency: u32) -> Self {
        Self::with_latency(Some(ack_latency))
    }

    /// Creates a bus whose peripheral never acknowledges.
    pub const fn unresponsive() -> Self {
        Self::with_latency(None)
    }

    const fn with_latency(ack_latency: Option<u32>) -> Self {
        Self {
            devices: Vec::new(),
            ack_latency,
            lines: BusLines::IDLE,
            ack: false,
            data_out: 0,
            wait: 0,
            served: false,
            edges: 0,
            strobed_edges: 0,
            transactions: Vec::new(),
            last_device_idx: 0,
        }
    }

    /// Registers a device on the bus; devices are sorted by base address for lookup.
    pub fn add_device(&mut self, dev: Box<dyn Device + Send + Sync>) {
        self.devices.push(dev);
        self.devices.sort_by_key(|d| d.address_range().0);
        self.last_device_idx = 0;
    }

    /// Registers a device and returns the bus, for builder-style setup.
    #[must_use]
    pub fn with_device(mut self, dev: Box<dyn Device + Send + Sync>) -> Self {
        self.add_device(dev);
        self
    }

    /// Changes the acknowledge latency for subsequent requests.
    pub const fn set_ack_latency(&mut self, ack_latency: Option<u32>) {
        self.ack_latency = ack_latency;
    }

    /// Lines as currently driven by the master.
    pub const fn lines(&self) -> BusLines {
        self.lines
    }

    /// Total clock edges seen.
    pub const fn edges(&self) -> u64 {
        self.edges
    }

    /// Clock edges on which the strobe was sampled high.
    pub const fn strobed_edges(&self) -> u64 {
        self.strobed_edges
    }

    /// Completed transactions, oldest first.
    pub fn transactions(&self) -> &[BusTransaction] {
        &self.transactions
    }

    /// Completed write transactions, oldest first.
    pub fn writes(&self) -> impl Iterator<Item = &BusTransaction> + '_ {
        self.transactions.iter().filter(|t| t.op == BusOp::Write)
    }

    /// Reads a word directly from the device, bypassing the handshake.
    pub fn peek(&mut self, address: u32) -> u32 {
        self.find_device(address)
            .map_or(0, |(dev, offset)| dev.read_u32(offset))
    }

    /// Writes a word directly to the device, bypassing the handshake.
    pub fn poke(&mut self, address: u32, val: u32) {
        if let Some((dev, offset)) = self.find_device(address) {
            dev.write_u32(offset, val);
        }
    }

    fn find_device(&mut self, address: u32) -> Option<(&mut Box<dyn Device + Send + Sync>, u32)> {
        if self.last_device_idx < self.devices.len() {
            let (start, size) = self.devices[self.last_device_idx].address_range();
            if address >= start && address - start < size {
                return Some((&mut self.devices[self.last_device_idx], address - start));
            }
        }

        for (i, dev) in self.devices.iter_mut().enumerate() {
            let (start, size) = dev.address_range();
            if address >= start && address - start < size {
                self.last_device_idx = i;
                return Some((dev, address - start));
            }
        }
        None
    }

    fn serve(&mut self) {
        let BusLines {
            write,
            address,
            data,
            ..
        } = self.lines;
        let (op, word) = if write {
            self.poke(address, data);
            (BusOp::Write, data)
        } else {
            let word = self.peek(address);
            self.data_out = word;
            (BusOp::Read, word)
        };
        trace!(%op, address, data = word, edge = self.edges, "bus acknowledge");
        self.transactions.push(BusTransaction {
            op,
            address,
            data: word,
        });
    }
}

impl BusPort for HandshakeBus {
    fn clock_edge(&mut self) {
        self.edges += 1;
        for dev in &mut self.devices {
            dev.tick();
        }

        if !self.lines.strobe {
            self.wait = 0;
            self.served = false;
            self.ack = false;
            return;
        }

        self.strobed_edges += 1;
        if self.served {
            self.ack = false;
            return;
        }

        self.wait += 1;
        let due = self
            .ack_latency
            .is_some_and(|latency| self.wait >= latency);
        if due {
            self.serve();
            self.served = true;
        }
        self.ack = due;
    }

    fn drive(&mut self, lines: BusLines) {
        self.lines = lines;
    }

    fn ack(&self) -> bool {
        self.ack
    }

    fn data_out(&self) -> u32 {
        self.data_out
    }
}
