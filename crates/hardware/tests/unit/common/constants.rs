use peakbench_core::common::constants::*;

#[test]
fn orbit_geometry() {
    assert_eq!(ORBIT_LENGTH, 3564);
    assert_eq!(SAMPLES_PER_BX, 30);
    assert!(ORBIT_EXCESS > ORBIT_LENGTH);
}

#[test]
fn bus_budget() {
    assert_eq!(BUS_TIMEOUT_EDGES, 10);
}

#[test]
fn amplitude_cap_covers_common_adcs() {
    assert!(MAX_AMPLITUDE_BITS >= 12);
    assert!(MAX_AMPLITUDE_BITS < usize::BITS);
}

#[test]
fn test_pulse_window_inside_orbit() {
    assert!(TEST_PULSE_START <= TEST_PULSE_STOP);
    assert!(TEST_PULSE_STOP < ORBIT_LENGTH);
}
