//! Smooth noise-robust differentiation.
//!
//! Central-difference derivative estimates that suppress high-frequency noise,
//! used by the derivative peak finder. The coefficient sets are the smooth
//! noise-robust differentiators for windows of 5, 7 and 9 samples; every
//! window divides by 4, matching the firmware's fixed-point scaling.

use crate::common::error::DerivativeError;

/// Window sizes with a coefficient set.
pub const SUPPORTED_WINDOWS: [usize; 3] = [5, 7, 9];

/// Coefficients applied to `x[i+k] - x[i-k]` for `k = 1..=wing`.
fn coefficients(window: usize) -> Option<&'static [i64]> {
    match window {
        5 => Some(&[2, 1]),
        7 => Some(&[5, 4, 1]),
        9 => Some(&[14, 14, 6, 1]),
        _ => None,
    }
}

/// Computes the derivative of `samples` with the given window.
///
/// The first and last `(window - 1) / 2` outputs have no full window and are
/// zero, so the output has the same length as the input. Division rounds
/// toward negative infinity.
///
/// # Errors
///
/// Returns [`DerivativeError::UnsupportedWindow`] unless `window` is 5, 7 or 9
/// and [`DerivativeError::NotEnoughSamples`] if the input is shorter than the
/// window.
pub fn snrd(samples: &[i64], window: usize) -> Result<Vec<i64>, DerivativeError> {
    let coeffs = coefficients(window).ok_or(DerivativeError::UnsupportedWindow(window))?;
    if samples.len() < window {
        return Err(DerivativeError::NotEnoughSamples {
            needed: window,
            got: samples.len(),
        });
    }

    let wing = (window - 1) / 2;
    let mut out = vec![0; samples.len()];
    for x in wing..samples.len() - wing {
        let sum: i64 = coeffs
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let k = i + 1;
                c * (samples[x + k] - samples[x - k])
            })
            .sum();
        out[x] = sum.div_euclid(4);
    }
    Ok(out)
}

/// Converts unsigned ADC samples and computes their derivative.
///
/// # Errors
///
/// As [`snrd`].
pub fn snrd_u32(samples: &[u32], window: usize) -> Result<Vec<i64>, DerivativeError> {
    let widened: Vec<i64> = samples.iter().map(|&s| i64::from(s)).collect();
    snrd(&widened, window)
}
