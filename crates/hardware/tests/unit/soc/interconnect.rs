//! # Handshake Bus Tests
//!
//! Routing, acknowledge timing and transaction logging of the simulated bus.

use std::sync::Arc;

use mockall::predicate::eq;
use peakbench_core::common::BusOp;
use peakbench_core::soc::devices::RegisterBank;
use peakbench_core::soc::{BusClient, BusLines, BusPort, HandshakeBus, Register, RegisterMap};

use crate::common::mocks::bus::MockBusDevice;

fn mock_at(base: u32, size: u32) -> MockBusDevice {
    let mut dev = MockBusDevice::new();
    let _ = dev.expect_address_range().return_const((base, size));
    let _ = dev.expect_tick().return_const(());
    let _ = dev.expect_name().return_const("MOCK");
    dev
}

#[test]
fn routes_read_to_device_offset() {
    let mut dev = mock_at(0x10, 4);
    let _ = dev
        .expect_read_u32()
        .with(eq(2))
        .times(1)
        .return_const(0xBEEF_u32);

    let bus = HandshakeBus::new(1).with_device(Box::new(dev));
    let map = RegisterMap::from_entries([("id", Register::word(0x12))]).unwrap();
    let mut client = BusClient::new(bus, Arc::new(map));
    assert_eq!(client.read("id").unwrap(), 0xBEEF);
}

#[test]
fn routes_write_to_device_offset() {
    let mut dev = mock_at(0x20, 8);
    let _ = dev
        .expect_write_u32()
        .with(eq(7), eq(0x1234))
        .times(1)
        .return_const(());

    let bus = HandshakeBus::new(3).with_device(Box::new(dev));
    let map = RegisterMap::from_entries([("ctrl", Register::word(0x27))]).unwrap();
    let mut client = BusClient::new(bus, Arc::new(map));
    client.write("ctrl", 0x1234).unwrap();
    assert_eq!(client.port().writes().count(), 1);
}

#[test]
fn devices_tick_every_edge() {
    let mut dev = MockBusDevice::new();
    let _ = dev.expect_address_range().return_const((0u32, 1u32));
    let _ = dev.expect_tick().times(5).return_const(());

    let mut bus = HandshakeBus::new(1).with_device(Box::new(dev));
    for _ in 0..5 {
        bus.clock_edge();
    }
    assert_eq!(bus.edges(), 5);
    assert_eq!(bus.strobed_edges(), 0);
}

#[test]
fn acknowledge_lasts_one_edge() {
    let mut bus = HandshakeBus::new(2).with_device(Box::new(RegisterBank::new("BANK", 0, 4)));
    bus.drive(BusLines::write(1, 9));

    bus.clock_edge();
    assert!(!bus.ack());
    bus.clock_edge();
    assert!(bus.ack());
    // master still strobing: served once, acknowledge drops
    bus.clock_edge();
    assert!(!bus.ack());
    assert_eq!(bus.transactions().len(), 1);
    assert_eq!(bus.peek(1), 9);
}

#[test]
fn unresponsive_bus_never_acknowledges() {
    let mut bus = HandshakeBus::unresponsive();
    bus.drive(BusLines::read(0));
    for _ in 0..100 {
        bus.clock_edge();
        assert!(!bus.ack());
    }
    assert_eq!(bus.strobed_edges(), 100);
}

#[test]
fn transaction_log_records_read_data() {
    let bank = RegisterBank::new("BANK", 0x100, 2).with_word(1, 0xA5);
    let bus = HandshakeBus::new(1).with_device(Box::new(bank));
    let map = RegisterMap::from_entries([("r", Register::word(0x101))]).unwrap();
    let mut client = BusClient::new(bus, Arc::new(map));
    let _ = client.read("r").unwrap();

    let log = client.port().transactions();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].op, BusOp::Read);
    assert_eq!(log[0].address, 0x101);
    assert_eq!(log[0].data, 0xA5);
}

#[test]
fn devices_found_regardless_of_insertion_order() {
    let mut bus = HandshakeBus::new(1);
    bus.add_device(Box::new(RegisterBank::new("HIGH", 0x200, 4).with_word(0, 2)));
    bus.add_device(Box::new(RegisterBank::new("LOW", 0x100, 4).with_word(0, 1)));
    assert_eq!(bus.peek(0x100), 1);
    assert_eq!(bus.peek(0x200), 2);
    assert_eq!(bus.peek(0x300), 0);
}
