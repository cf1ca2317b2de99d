//! Register bus components.
//!
//! This module organizes everything on the configuration path to a
//! peripheral: the symbolic register map, the handshake signal seam, the
//! masked register client, and a simulated bus with register-mapped devices.

/// Masked register read and read-modify-write client.
pub mod client;

/// Register-mapped peripheral implementations.
pub mod devices;

/// Simulated clocked handshake bus.
pub mod interconnect;

/// Symbolic register name to address and mask table.
pub mod registers;

/// Handshake lines and the bus port trait.
pub mod signals;

/// Device trait definitions for register-mapped access.
pub mod traits;

pub use client::BusClient;
pub use interconnect::{BusTransaction, HandshakeBus};
pub use registers::{Register, RegisterMap};
pub use signals::{BusLines, BusPort};
