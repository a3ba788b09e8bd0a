//! Authoritative membership set
//!
//! Shared by the manager, the counter service and the subscription table.
//! Writers are serialized by the manager; readers never observe a partial
//! change because each mutation happens under one write guard.

use std::collections::{BTreeSet, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::IntfId;

#[derive(Default)]
struct Sets {
    /// Interfaces that exist right now
    members: BTreeSet<IntfId>,
    /// Every interface the platform has ever reported, when tracked
    seen: HashSet<IntfId>,
}

/// Set of interfaces the platform currently reports as existing
///
/// The ever-seen set only grows, so it is kept only when asked for.
#[derive(Default)]
pub(crate) struct Membership {
    sets: RwLock<Sets>,
    track_seen: bool,
}

impl Membership {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Also remember every interface ever inserted, for [`Self::ever_seen`]
    pub(crate) fn tracking_seen() -> Self {
        Self {
            track_seen: true,
            ..Self::default()
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Sets> {
        self.sets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Sets> {
        self.sets.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns false if the interface was already a member
    pub(crate) fn insert(&self, intf_id: &IntfId) -> bool {
        let mut sets = self.write();
        if self.track_seen {
            sets.seen.insert(intf_id.clone());
        }
        sets.members.insert(intf_id.clone())
    }

    /// Returns false if the interface was not a member
    pub(crate) fn remove(&self, intf_id: &IntfId) -> bool {
        self.write().members.remove(intf_id)
    }

    pub(crate) fn contains(&self, intf_id: &IntfId) -> bool {
        self.read().members.contains(intf_id)
    }

    /// Always false unless built with [`Self::tracking_seen`]
    pub(crate) fn ever_seen(&self, intf_id: &IntfId) -> bool {
        self.read().seen.contains(intf_id)
    }

    /// Point-in-time copy of the members, in identifier order
    pub(crate) fn snapshot(&self) -> Vec<IntfId> {
        self.read().members.iter().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.read().members.len()
    }
}
