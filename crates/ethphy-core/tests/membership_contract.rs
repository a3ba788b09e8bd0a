//! Contract Test: Membership and Iteration
//!
//! Constraints verified:
//! - A created interface exists and is iterated exactly once
//! - A deleted interface no longer exists and is not iterated
//! - An iterator is a snapshot taken when it was obtained
//! - Iterating while the membership changes never crashes
//!
//! If this test fails, the registry no longer mirrors the platform.

mod common;

use common::*;
use ethphy_core::platform::PhyIntfEvent;
use ethphy_core::IntfId;
use std::sync::Arc;

#[test]
fn create_makes_interface_exist_and_iterable_once() {
    let (platform, mgr, _events) = direct_mgr();

    for n in [3, 1, 2] {
        create(&platform, &mgr, n);
    }

    for n in [1, 2, 3] {
        assert!(mgr.exists(&eth(n)));
        let occurrences = mgr.eth_phy_intf_iter().filter(|id| *id == eth(n)).count();
        assert_eq!(occurrences, 1, "{} should be iterated exactly once", eth(n));
    }

    let all: Vec<IntfId> = mgr.eth_phy_intf_iter().collect();
    assert_eq!(all, vec![eth(1), eth(2), eth(3)]);
}

#[test]
fn delete_removes_interface_from_exists_and_iteration() {
    let (platform, mgr, _events) = direct_mgr();
    create(&platform, &mgr, 1);
    create(&platform, &mgr, 2);

    delete(&platform, &mgr, 1);

    assert!(!mgr.exists(&eth(1)));
    assert!(mgr.exists(&eth(2)));
    assert!(mgr.eth_phy_intf_iter().all(|id| id != eth(1)));
    assert_eq!(mgr.len(), 1);
}

#[test]
fn iterator_is_snapshot_at_creation() {
    let (platform, mgr, _events) = direct_mgr();
    create(&platform, &mgr, 1);
    create(&platform, &mgr, 2);

    let mut iter = mgr.eth_phy_intf_iter();
    assert_eq!(iter.len(), 2);
    assert_eq!(iter.next(), Some(eth(1)));

    // Mutate while the iterator is half consumed
    delete(&platform, &mgr, 2);
    create(&platform, &mgr, 3);

    assert_eq!(iter.next(), Some(eth(2)));
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next(), None);

    // A fresh iterator sees the new membership
    let fresh: Vec<IntfId> = mgr.eth_phy_intf_iter().collect();
    assert_eq!(fresh, vec![eth(1), eth(3)]);
}

#[test]
fn empty_registry_yields_nothing() {
    let (_platform, mgr, _events) = direct_mgr();
    assert!(mgr.is_empty());
    assert_eq!(mgr.eth_phy_intf_iter().count(), 0);
}

#[test]
fn recycled_identifier_is_a_new_member() {
    let (platform, mgr, _events) = direct_mgr();
    create(&platform, &mgr, 1);
    delete(&platform, &mgr, 1);
    create(&platform, &mgr, 1);

    assert!(mgr.exists(&eth(1)));
    assert_eq!(mgr.eth_phy_intf_iter().count(), 1);
}

#[test]
fn iteration_under_concurrent_mutation_does_not_crash() {
    let (_platform, mgr, _events) = direct_mgr();
    let mgr = Arc::new(mgr);

    let writer = {
        let mgr = mgr.clone();
        std::thread::spawn(move || {
            for round in 0..200 {
                let id = eth(round % 16);
                mgr.apply(PhyIntfEvent::create(id.clone()));
                mgr.apply(PhyIntfEvent::delete(id));
            }
        })
    };

    for _ in 0..200 {
        let snapshot: Vec<IntfId> = mgr.eth_phy_intf_iter().collect();
        let mut sorted = snapshot.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(snapshot, sorted, "snapshot must be ordered and duplicate-free");
    }

    writer.join().expect("writer thread does not panic");
    assert!(mgr.is_empty());
}
