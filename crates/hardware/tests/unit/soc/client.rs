//! # Register Client Tests
//!
//! Masked reads, read-modify-write, timeouts and line discipline of
//! [`BusClient`](peakbench_core::soc::BusClient).

use std::sync::Arc;

use peakbench_core::common::{BusError, BusOp};
use peakbench_core::soc::{BusClient, BusLines, BusTransaction};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::{BenchContext, bench_map};
use crate::common::mocks::bus::ScriptedPort;

// ─── Reads ─────────────────────────────────────────────────────────────────

#[test]
fn read_full_word() {
    let mut ctx = BenchContext::default();
    ctx.bus_mut().poke(0x1, 0xDEAD_BEEF);
    assert_eq!(ctx.client.read("status").unwrap(), 0xDEAD_BEEF);
    assert_eq!(
        ctx.bus().transactions(),
        &[BusTransaction {
            op: BusOp::Read,
            address: 0x1,
            data: 0xDEAD_BEEF
        }]
    );
}

#[test]
fn read_decodes_subfields() {
    let mut ctx = BenchContext::default();
    ctx.bus_mut().poke(0x2, 0x00AB_0123);
    assert_eq!(ctx.client.read("level_threshold").unwrap(), 0x123);
    assert_eq!(ctx.client.read("tot_threshold").unwrap(), 0xAB);
    assert_eq!(ctx.client.read_raw("level_threshold").unwrap(), 0x00AB_0123);
    assert_eq!(ctx.client.read_with("tot_threshold", false).unwrap(), 0x00AB_0123);
}

#[test]
fn unmapped_address_reads_zero() {
    let mut ctx = BenchContext::default();
    assert_eq!(ctx.client.read("unmapped").unwrap(), 0);
}

#[test]
fn read_data_is_sampled_on_acknowledging_edge() {
    let mut client = BusClient::new(ScriptedPort::new(vec![3], 0x55), Arc::new(bench_map()));
    assert_eq!(client.read("status").unwrap(), 0x55);

    let port = client.into_inner();
    assert_eq!(port.driven, vec![(1, BusLines::read(0x1)), (3, BusLines::IDLE)]);
    assert!(port.lines.is_idle());
}

// ─── Writes ────────────────────────────────────────────────────────────────

#[test]
fn full_word_write_skips_read() {
    let mut ctx = BenchContext::default();
    ctx.client.write("enable", 1).unwrap();
    assert_eq!(
        ctx.bus().transactions(),
        &[BusTransaction {
            op: BusOp::Write,
            address: 0x0,
            data: 1
        }]
    );
}

#[test]
fn subfield_write_then_read_back() {
    let mut ctx = BenchContext::default();
    ctx.client.write("level_threshold", 0x123).unwrap();

    let writes: Vec<_> = ctx.bus().writes().copied().collect();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].address, 0x2);
    assert_eq!(writes[0].data, 0x123);
    assert_eq!(ctx.bus().transactions()[0].op, BusOp::Read);

    assert_eq!(ctx.client.read("level_threshold").unwrap(), 0x123);
}

#[test]
fn subfield_write_preserves_siblings() {
    let mut ctx = BenchContext::default();
    ctx.client.write("tot_threshold", 0x3).unwrap();
    ctx.client.write("level_threshold", 0x82).unwrap();
    ctx.client.write("tot_threshold", 0x5).unwrap();

    assert_eq!(ctx.bus_mut().peek(0x2), 0x0005_0082);
    assert_eq!(ctx.client.read("level_threshold").unwrap(), 0x82);
    assert_eq!(ctx.client.read("tot_threshold").unwrap(), 0x5);
}

#[test]
fn wide_value_is_truncated_to_field() {
    let mut ctx = BenchContext::default();
    ctx.bus_mut().poke(0x3, 0xFFFF_FF0F);
    ctx.client.write("mode", 0x7).unwrap();
    assert_eq!(ctx.bus_mut().peek(0x3), 0xFFFF_FF3F);
    assert_eq!(ctx.client.read("mode").unwrap(), 0x3);
}

#[test]
fn write_all_applies_in_order_and_stops_on_error() {
    let mut ctx = BenchContext::default();
    let err = ctx
        .client
        .write_all([("enable", 1), ("ghost", 2), ("status", 3)])
        .unwrap_err();
    assert!(matches!(
        err,
        BusError::UnknownRegister {
            op: Some(BusOp::Write),
            ..
        }
    ));
    assert_eq!(ctx.bus_mut().peek(0x0), 1);
    assert_eq!(ctx.bus_mut().peek(0x1), 0);
}

// ─── Failures ──────────────────────────────────────────────────────────────

#[test]
fn unknown_register_touches_no_lines() {
    let mut ctx = BenchContext::default();
    assert_eq!(
        ctx.client.read("ghost"),
        Err(BusError::UnknownRegister {
            name: "ghost".to_string(),
            op: Some(BusOp::Read),
        })
    );
    assert_eq!(
        ctx.client.write("ghost", 1),
        Err(BusError::UnknownRegister {
            name: "ghost".to_string(),
            op: Some(BusOp::Write),
        })
    );
    assert_eq!(ctx.bus().edges(), 0);
}

#[test]
fn timeout_after_exactly_budget_edges() {
    let mut ctx = BenchContext::unresponsive();
    let err = ctx.client.read("status").unwrap_err();
    assert_eq!(
        err,
        BusError::Timeout {
            register: "status".to_string(),
            op: BusOp::Read,
            edges: 10
        }
    );
    assert_eq!(ctx.bus().strobed_edges(), 10);
    assert!(ctx.bus().lines().is_idle());
    assert!(ctx.bus().transactions().is_empty());
}

#[test]
fn subfield_write_times_out_on_preliminary_read() {
    let mut ctx = BenchContext::unresponsive();
    let err = ctx.client.write("mode", 1).unwrap_err();
    assert!(matches!(err, BusError::Timeout { op: BusOp::Read, .. }));
    assert_eq!(ctx.bus().strobed_edges(), 10);
}

#[test]
fn bus_recovers_after_timeout() {
    let mut ctx = BenchContext::unresponsive();
    assert!(ctx.client.write("enable", 1).is_err());

    ctx.bus_mut().set_ack_latency(Some(2));
    ctx.client.write("enable", 1).unwrap();
    assert_eq!(ctx.client.read("enable").unwrap(), 1);
}

#[rstest]
#[case(1, true)]
#[case(5, true)]
#[case(10, true)]
#[case(11, false)]
fn ack_latency_against_budget(#[case] latency: u32, #[case] completes: bool) {
    let mut ctx = BenchContext::new(latency);
    assert_eq!(ctx.client.read("status").is_ok(), completes);
    assert!(ctx.bus().lines().is_idle());
}

#[test]
fn custom_budget_from_config() {
    let config = peakbench_core::config::BusConfig { timeout_edges: 3 };
    let mut client = BusClient::with_config(ScriptedPort::silent(), Arc::new(bench_map()), &config);
    assert_eq!(client.timeout_edges(), 3);
    assert!(client.read("status").is_err());
    // one setup edge plus the budget
    assert_eq!(client.port().edge, 4);
}
