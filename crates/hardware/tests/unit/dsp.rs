//! # Derivative Tests

use peakbench_core::common::DerivativeError;
use peakbench_core::dsp::{SUPPORTED_WINDOWS, snrd, snrd_u32};
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case(5, vec![0, 0, 4, 4, 4, 4, 0, 0])]
#[case(7, vec![0, 0, 0, 16, 16, 0, 0, 0])]
fn ramp_derivative(#[case] window: usize, #[case] expected: Vec<i64>) {
    // slope 2 per sample
    let ramp: Vec<i64> = (0..8).map(|i| i * 2).collect();
    assert_eq!(snrd(&ramp, window).unwrap(), expected);
}

#[test]
fn input_shorter_than_window() {
    let ramp: Vec<i64> = (0..8).collect();
    assert_eq!(
        snrd(&ramp, 9),
        Err(DerivativeError::NotEnoughSamples { needed: 9, got: 8 })
    );
}

#[test]
fn window_9_on_ramp() {
    let ramp: Vec<i64> = (0..12).map(|i| i * 2).collect();
    let d = snrd(&ramp, 9).unwrap();
    // (14*4 + 14*8 + 6*12 + 1*16) / 4
    assert_eq!(&d[4..8], &[64, 64, 64, 64]);
    assert!(d[..4].iter().chain(&d[8..]).all(|&v| v == 0));
}

#[rstest]
#[case(0)]
#[case(3)]
#[case(6)]
#[case(11)]
fn unsupported_windows(#[case] window: usize) {
    assert_eq!(snrd(&[0; 16], window), Err(DerivativeError::UnsupportedWindow(window)));
}

#[test]
fn unsigned_input_matches_signed() {
    let raw = [3u32, 9, 27, 81, 27, 9, 3, 1];
    let signed: Vec<i64> = raw.iter().map(|&s| i64::from(s)).collect();
    assert_eq!(snrd_u32(&raw, 5).unwrap(), snrd(&signed, 5).unwrap());
}

proptest! {
    #[test]
    fn output_length_matches_input(
        samples in prop::collection::vec(-1000i64..1000, 9..64),
        idx in 0usize..3,
    ) {
        let window = SUPPORTED_WINDOWS[idx];
        let d = snrd(&samples, window).unwrap();
        prop_assert_eq!(d.len(), samples.len());
        let wing = (window - 1) / 2;
        prop_assert!(d[..wing].iter().all(|&v| v == 0));
        prop_assert!(d[d.len() - wing..].iter().all(|&v| v == 0));
    }

    #[test]
    fn constant_signal_has_zero_derivative(level in -500i64..500, len in 9usize..40) {
        let d = snrd(&vec![level; len], 7).unwrap();
        prop_assert!(d.iter().all(|&v| v == 0));
    }
}

#[test]
fn falling_edge_rounds_down() {
    // (2*(0 - 0) + (0 - 1)) / 4 = -0.25
    let d = snrd(&[1, 0, 0, 0, 0], 5).unwrap();
    assert_eq!(d, vec![0, 0, -1, 0, 0]);
}

#[rstest]
#[case(vec![0, 0, 10, 40, 80, 100, 80, 40, 10, 0], 6, -48)]
#[case(vec![0, 0, 50, 100, 50, 0, 0, 50, 100, 50, 0, 0], 5, -38)]
fn negative_slopes_floor(#[case] samples: Vec<i64>, #[case] idx: usize, #[case] expected: i64) {
    assert_eq!(snrd(&samples, 5).unwrap()[idx], expected);
}

#[test]
fn rising_and_falling_edges_are_not_mirror_images() {
    let rise = snrd(&[0, 0, 0, 0, 1], 5).unwrap();
    let fall = snrd(&[1, 0, 0, 0, 0], 5).unwrap();
    assert_eq!(rise[2], 0);
    assert_eq!(fall[2], -1);
}
