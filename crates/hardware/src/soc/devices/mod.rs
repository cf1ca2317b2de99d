//! Register-mapped peripherals.
//!
//! This module contains the peripherals that can sit behind the simulated
//! handshake bus.

/// Plain word-addressed register file.
pub mod register_bank;

pub use register_bank::RegisterBank;

pub use crate::soc::traits::Device;
