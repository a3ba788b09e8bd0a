//! Contract Test: Attribute and Counter Queries
//!
//! Constraints verified:
//! - Every attribute and counter query reports NotFound for a non-member
//! - Queries are forwarded to the platform on every call (no caching)
//! - An interface deleted after iteration surfaces as NotFound, not a panic
//! - Platform failures surface as Unavailable and leave the registry intact
//!
//! If this test fails, the query layer is caching or crashing.

mod common;

use common::*;
use ethphy_core::{EthPhyIntfBinCounters, EthPhyIntfCounters, Error, FrameSizeBins, LinkSpeed};

#[test]
fn queries_on_missing_interface_report_not_found() {
    let (_platform, mgr, _events) = direct_mgr();
    let counter_mgr = mgr.counter_mgr();
    let missing = eth(42);

    assert!(!mgr.exists(&missing));
    assert!(matches!(mgr.burned_in_eth_addr(&missing), Err(Error::NotFound(id)) if id == missing));
    assert!(matches!(mgr.link_speed(&missing), Err(Error::NotFound(_))));
    assert!(matches!(counter_mgr.counters(&missing), Err(Error::NotFound(_))));
    assert!(matches!(counter_mgr.bin_counters(&missing), Err(Error::NotFound(_))));
}

#[test]
fn queries_on_deleted_interface_report_not_found() {
    let (platform, mgr, _events) = direct_mgr();
    let counter_mgr = mgr.counter_mgr();
    create(&platform, &mgr, 1);
    delete(&platform, &mgr, 1);

    assert!(mgr.burned_in_eth_addr(&eth(1)).unwrap_err().is_not_found());
    assert!(mgr.link_speed(&eth(1)).unwrap_err().is_not_found());
    assert!(counter_mgr.counters(&eth(1)).unwrap_err().is_not_found());
    assert!(counter_mgr.bin_counters(&eth(1)).unwrap_err().is_not_found());
}

#[test]
fn burned_in_address_comes_from_platform() {
    let (platform, mgr, _events) = direct_mgr();
    create(&platform, &mgr, 5);

    assert_eq!(mgr.burned_in_eth_addr(&eth(5)).unwrap(), addr(5));
}

#[test]
fn link_speed_reflects_current_platform_state() {
    let (platform, mgr, _events) = direct_mgr();
    create(&platform, &mgr, 1);
    assert_eq!(mgr.link_speed(&eth(1)).unwrap(), LinkSpeed::Gbps10);

    platform.set_link_speed(&eth(1), LinkSpeed::Gbps100).unwrap();
    assert_eq!(mgr.link_speed(&eth(1)).unwrap(), LinkSpeed::Gbps100);

    platform.set_link_speed(&eth(1), LinkSpeed::Unknown).unwrap();
    assert_eq!(mgr.link_speed(&eth(1)).unwrap(), LinkSpeed::Unknown);
}

#[test]
fn counters_are_fetched_fresh_each_call() {
    let (platform, mgr, _events) = direct_mgr();
    let counter_mgr = mgr.counter_mgr();
    create(&platform, &mgr, 1);

    for fcs_errors in [1, 5, 9] {
        platform
            .set_counters(
                &eth(1),
                EthPhyIntfCounters {
                    fcs_errors,
                    in_pause_frames: fcs_errors * 2,
                    ..EthPhyIntfCounters::zeroed()
                },
            )
            .unwrap();
        let snapshot = counter_mgr.counters(&eth(1)).unwrap();
        assert_eq!(snapshot.fcs_errors, fcs_errors);
        assert_eq!(snapshot.in_pause_frames, fcs_errors * 2);
    }
}

#[test]
fn bin_counters_are_fetched_fresh_each_call() {
    let (platform, mgr, _events) = direct_mgr();
    let counter_mgr = mgr.counter_mgr();
    create(&platform, &mgr, 1);

    let bins = EthPhyIntfBinCounters {
        input: FrameSizeBins {
            frames_64_octet: 100,
            frames_1024_to_1522_octet: 20,
            ..FrameSizeBins::default()
        },
        output: FrameSizeBins {
            frames_128_to_255_octet: 3,
            ..FrameSizeBins::default()
        },
        ..EthPhyIntfBinCounters::zeroed()
    };
    platform.set_bin_counters(&eth(1), bins).unwrap();

    let snapshot = counter_mgr.bin_counters(&eth(1)).unwrap();
    assert_eq!(snapshot.total_in_frames(), 120);
    assert_eq!(snapshot.total_out_frames(), 3);
}

#[test]
fn interface_gone_between_iteration_and_query() {
    let (platform, mgr, _events) = direct_mgr();
    create(&platform, &mgr, 1);
    create(&platform, &mgr, 2);

    let mut results = Vec::new();
    for (i, intf_id) in mgr.eth_phy_intf_iter().enumerate() {
        if i == 0 {
            delete(&platform, &mgr, 2);
        }
        results.push(mgr.link_speed(&intf_id).map_err(|e| e.is_not_found()));
    }

    assert_eq!(results, vec![Ok(LinkSpeed::Gbps10), Err(true)]);
}

#[test]
fn unavailable_platform_fails_query_only() {
    let (platform, mgr, _events) = direct_mgr();
    let counter_mgr = mgr.counter_mgr();
    create(&platform, &mgr, 1);

    platform.set_available(false);
    assert!(matches!(mgr.link_speed(&eth(1)), Err(Error::Unavailable(_))));
    assert!(matches!(counter_mgr.counters(&eth(1)), Err(Error::Unavailable(_))));

    // Membership is untouched and queries recover with the platform
    assert!(mgr.exists(&eth(1)));
    platform.set_available(true);
    assert_eq!(mgr.link_speed(&eth(1)).unwrap(), LinkSpeed::Gbps10);
}

#[test]
fn counter_mgr_is_independent_of_manager_lifetime() {
    let (platform, mgr, _events) = direct_mgr();
    create(&platform, &mgr, 1);
    let counter_mgr = mgr.counter_mgr();
    drop(mgr);

    assert!(counter_mgr.counters(&eth(1)).is_ok());
}
