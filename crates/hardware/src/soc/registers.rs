//! Symbolic register map.
//!
//! Maps register names to a word address and a field mask. Lookups are by
//! name only; the map is built once at setup and never mutated by the client.

use std::collections::BTreeMap;

use crate::common::error::BusError;
use crate::common::field::{self, FULL_WORD};

/// Address and field mask of one register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Register {
    /// Word address on the bus.
    pub address: u32,
    /// Contiguous mask selecting the field within the word.
    pub mask: u32,
}

impl Register {
    /// Creates a register entry; the mask is validated on insertion into a map.
    pub const fn new(address: u32, mask: u32) -> Self {
        Self { address, mask }
    }

    /// Creates an entry covering the whole word at `address`.
    pub const fn word(address: u32) -> Self {
        Self {
            address,
            mask: FULL_WORD,
        }
    }

    /// Returns `true` if the field is only part of its word.
    ///
    /// Writes to such fields must preserve the sibling bits.
    pub const fn is_subfield(&self) -> bool {
        self.mask != FULL_WORD
    }

    /// Bit position of the field's least-significant bit.
    pub const fn shift(&self) -> u32 {
        self.mask.trailing_zeros()
    }

    /// Width of the field in bits.
    pub const fn width(&self) -> u32 {
        self.mask.count_ones()
    }
}

/// Immutable name to register table.
#[derive(Clone, Debug, Default)]
pub struct RegisterMap {
    entries: BTreeMap<String, Register>,
}

impl RegisterMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(name, register)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidMask`] for the first entry whose mask is zero
    /// or not a contiguous run of bits.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, BusError>
    where
        I: IntoIterator<Item = (S, Register)>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for (name, reg) in entries {
            let _ = map.insert(name, reg)?;
        }
        Ok(map)
    }

    /// Adds or replaces an entry, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidMask`] if the mask is zero or not contiguous.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        reg: Register,
    ) -> Result<Option<Register>, BusError> {
        if !field::is_contiguous(reg.mask) {
            return Err(BusError::InvalidMask { mask: reg.mask });
        }
        Ok(self.entries.insert(name.into(), reg))
    }

    /// Returns the address and mask registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::UnknownRegister`] if `name` is absent.
    pub fn resolve(&self, name: &str) -> Result<Register, BusError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| BusError::UnknownRegister {
                name: name.to_string(),
                op: None,
            })
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no register is defined.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Register)> + '_ {
        self.entries.iter().map(|(name, reg)| (name.as_str(), *reg))
    }
}
