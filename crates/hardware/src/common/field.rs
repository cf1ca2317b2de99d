//! Masked bit-field helpers.
//!
//! A register exposes a sub-field selected by a contiguous mask. Values are
//! shifted up to the mask's least-significant set bit on encode and shifted
//! back down on decode.

use super::error::BusError;

/// Mask selecting an entire register word.
pub const FULL_WORD: u32 = u32::MAX;

/// Returns the position of the least-significant set bit of `mask`.
///
/// # Errors
///
/// Returns [`BusError::InvalidMask`] if `mask` is zero.
#[inline]
pub fn shift_for(mask: u32) -> Result<u32, BusError> {
    if mask == 0 {
        return Err(BusError::InvalidMask { mask });
    }
    Ok(mask.trailing_zeros())
}

/// Places `value` into the field selected by `mask`.
///
/// Bits of `value` that do not fit the field are dropped.
///
/// # Errors
///
/// Returns [`BusError::InvalidMask`] if `mask` is zero.
#[inline]
pub fn encode(mask: u32, value: u32) -> Result<u32, BusError> {
    let shift = shift_for(mask)?;
    Ok((value << shift) & mask)
}

/// Extracts the field selected by `mask` from a raw register word.
///
/// # Errors
///
/// Returns [`BusError::InvalidMask`] if `mask` is zero.
#[inline]
pub fn decode(mask: u32, raw: u32) -> Result<u32, BusError> {
    let shift = shift_for(mask)?;
    Ok((raw & mask) >> shift)
}

/// Returns `true` if `mask` is a single non-empty run of set bits.
#[inline]
pub const fn is_contiguous(mask: u32) -> bool {
    if mask == 0 {
        return false;
    }
    let run = mask >> mask.trailing_zeros();
    run & run.wrapping_add(1) == 0
}

/// Returns `true` if `value` survives `encode` under `mask` without truncation.
#[inline]
pub fn fits(mask: u32, value: u32) -> bool {
    match decode(mask, FULL_WORD) {
        Ok(max) => value <= max,
        Err(_) => false,
    }
}
