//! # Register Map Tests

use peakbench_core::common::BusError;
use peakbench_core::soc::{Register, RegisterMap};

#[test]
fn resolve_known_register() {
    let map = crate::common::harness::bench_map();
    assert_eq!(map.resolve("mode").unwrap(), Register::new(0x3, 0x30));
    assert!(map.contains("enable"));
}

#[test]
fn resolve_unknown_register() {
    let map = RegisterMap::new();
    assert_eq!(
        map.resolve("ghost"),
        Err(BusError::UnknownRegister {
            name: "ghost".to_string(),
            op: None,
        })
    );
}

#[test]
fn insert_rejects_bad_masks() {
    let mut map = RegisterMap::new();
    assert_eq!(
        map.insert("zero", Register::new(0, 0)),
        Err(BusError::InvalidMask { mask: 0 })
    );
    assert!(map.insert("split", Register::new(0, 0b1010)).is_err());
    assert!(map.is_empty());
}

#[test]
fn insert_replaces_and_returns_previous() {
    let mut map = RegisterMap::new();
    assert_eq!(map.insert("a", Register::word(1)).unwrap(), None);
    assert_eq!(map.insert("a", Register::word(2)).unwrap(), Some(Register::word(1)));
    assert_eq!(map.len(), 1);
}

#[test]
fn register_geometry() {
    let reg = Register::new(0x2, 0x00FF_0000);
    assert!(reg.is_subfield());
    assert_eq!(reg.shift(), 16);
    assert_eq!(reg.width(), 8);
    assert!(!Register::word(0).is_subfield());
}

#[test]
fn iter_is_name_ordered() {
    let map = crate::common::harness::bench_map();
    let names: Vec<_> = map.iter().map(|(name, _)| name).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
}
