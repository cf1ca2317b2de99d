//! Device trait for register-mapped peripherals.
//!
//! This module defines the `Device` trait implemented by everything that answers
//! transactions on the simulated handshake bus. It provides:
//! 1. **Identification:** `name` and `address_range` for bus routing.
//! 2. **Access:** Word read/write at device-relative word offsets.
//! 3. **Lifecycle:** An optional `tick` run on every bus clock edge.
//!
//! All implementors must be `Send + Sync` so a bus can be moved across threads.

/// Trait for peripherals attached to the handshake bus.
pub trait Device: Send + Sync {
    /// Returns a short name for this device (e.g., `"PEAKFINDER"`).
    fn name(&self) -> &str;
    /// Returns (base word address, size in words) of this device's register window.
    fn address_range(&self) -> (u32, u32);
    /// Reads the word at the given device-relative offset.
    fn read_u32(&mut self, offset: u32) -> u32;
    /// Writes the word at the given device-relative offset.
    fn write_u32(&mut self, offset: u32, val: u32);

    /// Advances device state by one bus clock edge (default: no-op).
    fn tick(&mut self) {}
}
