//! Register Bank.
//!
//! A word-addressed register file standing in for a peripheral's configuration
//! and status space. Every word is readable and writable; words start at zero
//! unless preset.

use crate::soc::devices::Device;

/// Register file device.
#[derive(Clone, Debug)]
pub struct RegisterBank {
    name: String,
    /// Word address of the first register.
    base_addr: u32,
    words: Vec<u32>,
}

impl RegisterBank {
    /// Creates a zeroed bank of `size` words starting at `base_addr`.
    ///
    /// # Arguments
    ///
    /// * `name` - Device name reported to the bus.
    /// * `base_addr` - Word address of offset zero.
    /// * `size` - Number of words.
    pub fn new(name: impl Into<String>, base_addr: u32, size: u32) -> Self {
        Self {
            name: name.into(),
            base_addr,
            words: vec![0; size as usize],
        }
    }

    /// Presets the word at `offset`; out-of-range offsets are ignored.
    #[must_use]
    pub fn with_word(mut self, offset: u32, val: u32) -> Self {
        self.write_u32(offset, val);
        self
    }

    /// Returns the word at `offset` without a bus transaction.
    pub fn peek(&self, offset: u32) -> Option<u32> {
        self.words.get(offset as usize).copied()
    }
}

impl Device for RegisterBank {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u32, u32) {
        (self.base_addr, self.words.len() as u32)
    }

    /// Reads a word; out-of-range offsets read as zero.
    fn read_u32(&mut self, offset: u32) -> u32 {
        self.peek(offset).unwrap_or(0)
    }

    /// Writes a word; out-of-range offsets are ignored.
    fn write_u32(&mut self, offset: u32, val: u32) {
        if let Some(word) = self.words.get_mut(offset as usize) {
            *word = val;
        }
    }
}
