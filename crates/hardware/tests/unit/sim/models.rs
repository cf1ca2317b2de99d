//! # Peak Finder Model Tests

use peakbench_core::config::ExtractorConfig;
use peakbench_core::sim::{DerivativeDetector, PeakSource, ThresholdDetector};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn derivative(window: usize, max_peaks: u32) -> DerivativeDetector {
    DerivativeDetector {
        window,
        max_peaks,
        ..DerivativeDetector::default()
    }
}

// ─── Threshold ─────────────────────────────────────────────────────────────

#[test]
fn threshold_defaults() {
    let det = ThresholdDetector::default();
    assert_eq!(det.level_threshold, 130);
    assert_eq!(det.tot_threshold, 3);
}

#[rstest]
#[case(&[0, 131, 140, 135, 0], Some((2, 140, 3)))]
#[case(&[0, 131, 140, 0, 0], None)]
#[case(&[130, 130, 130, 130], None)]
#[case(&[200, 200, 200, 0, 140, 150, 160, 170], Some((7, 170, 4)))]
fn threshold_reports_longest_run(#[case] bx: &[u32], #[case] expected: Option<(u32, i64, u32)>) {
    let mut det = ThresholdDetector::default();
    let report = det.inspect(bx);
    let got = report
        .hits
        .first()
        .map(|h| (h.position, h.amplitude, h.tot.unwrap_or_default()));
    assert_eq!(got, expected);
    assert!(report.hits.iter().all(|h| h.channel == h.position));
    assert_eq!(report.derived, None);
}

#[test]
fn threshold_shape_is_parallel_without_latency() {
    let config = ExtractorConfig::default();
    let shape = ThresholdDetector::default().shape(&config);
    assert_eq!(shape.channels, 30);
    assert!(shape.reports_tot);
    assert_eq!(shape.latency_bx, 0);
}

// ─── Derivative ────────────────────────────────────────────────────────────

#[test]
fn derivative_finds_single_peak() {
    let mut det = derivative(5, 3);
    let report = det.inspect(&[0, 0, 10, 40, 80, 100, 80, 40, 10, 0]);
    assert_eq!(report.hits.len(), 1);
    let hit = report.hits[0];
    assert_eq!((hit.channel, hit.position, hit.amplitude, hit.tot), (0, 5, 100, None));
    assert_eq!(report.derived, Some(vec![0, 0, 40, 60, 47, 0, -48, -60, 0, 0]));
}

#[test]
fn derivative_numbers_peaks_in_order() {
    let bx = [0, 0, 50, 100, 50, 0, 0, 50, 100, 50, 0, 0];
    let report = derivative(5, 3).inspect(&bx);
    let found: Vec<_> = report.hits.iter().map(|h| (h.channel, h.position)).collect();
    assert_eq!(found, vec![(0, 3), (1, 8)]);

    let capped = derivative(5, 1).inspect(&bx);
    assert_eq!(capped.hits.len(), 1);
    assert_eq!(capped.hits[0].position, 3);
}

#[test]
fn derivative_respects_value_threshold() {
    let mut det = DerivativeDetector {
        value_threshold: 101,
        ..derivative(5, 3)
    };
    let report = det.inspect(&[0, 0, 10, 40, 80, 100, 80, 40, 10, 0]);
    assert!(!report.is_asserted());
    assert!(report.derived.is_some());
}

#[test]
fn derivative_on_short_crossing_is_quiet() {
    let report = derivative(7, 3).inspect(&[1, 2, 3]);
    assert!(!report.is_asserted());
    assert_eq!(report.derived, None);
}

#[test]
fn derivative_shape() {
    let config = ExtractorConfig::default();
    let shape = derivative(7, 2).shape(&config);
    assert_eq!(shape.channels, 2);
    assert!(!shape.reports_tot);
    assert_eq!(shape.ring_depth(), 1);
}
