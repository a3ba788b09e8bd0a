//! Handler subscription and dispatch
//!
//! Observers implement [`EthPhyIntfHandler`] and register it with the
//! manager, receiving a [`HandlerHandle`]. Through the handle a handler
//! turns on interest in every interface (global scope) or in single
//! interfaces (scoped). The two scopes are independent flags, both off
//! after registration.
//!
//! ## Dispatch
//!
//! For a create or delete of interface X, every handler whose global flag
//! is on, or whose scoped flag for X is on, is called once. Eligible
//! handlers are copied out of the table before any callback runs, so a
//! callback may change subscriptions (its own or others') or query the
//! manager. Such changes take effect from the next event; the event being
//! dispatched is not retracted.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::debug;

use crate::error::{Error, Result};
use crate::manager::membership::Membership;
use crate::platform::{PhyIntfEvent, PhyIntfEventKind};
use crate::types::IntfId;

/// A handler for Ethernet physical interface events
///
/// Both callbacks default to doing nothing; override the ones you need.
///
/// Callbacks run on the manager's dispatch task, one event at a time and in
/// the order the events were applied. They must not block for long, and
/// must not feed events back into [`crate::EthPhyIntfMgr::apply`].
pub trait EthPhyIntfHandler: Send + Sync {
    /// Called when a physical Ethernet interface is created
    fn on_eth_phy_intf_create(&self, _intf_id: &IntfId) {}

    /// Called when a physical Ethernet interface is deleted
    fn on_eth_phy_intf_delete(&self, _intf_id: &IntfId) {}
}

/// Registration number of a handler, unique per manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(u64);

#[derive(Default)]
struct Subscriptions {
    handlers: BTreeMap<HandlerId, Arc<dyn EthPhyIntfHandler>>,
    global: BTreeSet<HandlerId>,
    by_intf: HashMap<IntfId, BTreeSet<HandlerId>>,
}

impl Subscriptions {
    fn remove_scoped(&mut self, handler_id: HandlerId, intf_id: &IntfId) {
        if let Some(set) = self.by_intf.get_mut(intf_id) {
            set.remove(&handler_id);
            if set.is_empty() {
                self.by_intf.remove(intf_id);
            }
        }
    }
}

/// Subscription table shared between the manager and handler handles
pub(crate) struct SubscriptionTable {
    inner: Mutex<Subscriptions>,
    next_id: AtomicU64,
    /// When set, scoped watches must name an interface seen before
    known_targets: Option<Arc<Membership>>,
}

impl SubscriptionTable {
    pub(crate) fn new(known_targets: Option<Arc<Membership>>) -> Self {
        Self {
            inner: Mutex::new(Subscriptions::default()),
            next_id: AtomicU64::new(1),
            known_targets,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Subscriptions> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(&self, handler: Arc<dyn EthPhyIntfHandler>) -> HandlerId {
        let handler_id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().handlers.insert(handler_id, handler);
        handler_id
    }

    fn unregister(&self, handler_id: HandlerId) {
        let mut subs = self.lock();
        subs.handlers.remove(&handler_id);
        subs.global.remove(&handler_id);
        subs.by_intf.retain(|_, set| {
            set.remove(&handler_id);
            !set.is_empty()
        });
    }

    fn set_watch_all(&self, handler_id: HandlerId, on: bool) {
        let mut subs = self.lock();
        if !subs.handlers.contains_key(&handler_id) {
            debug!("watch_all on unregistered handler {:?} ignored", handler_id);
            return;
        }
        if on {
            subs.global.insert(handler_id);
        } else {
            subs.global.remove(&handler_id);
        }
    }

    fn set_watch(&self, handler_id: HandlerId, intf_id: &IntfId, on: bool) -> Result<()> {
        if on
            && let Some(known) = &self.known_targets
            && !known.ever_seen(intf_id)
        {
            return Err(Error::InvalidSubscriptionTarget(intf_id.clone()));
        }

        let mut subs = self.lock();
        if !subs.handlers.contains_key(&handler_id) {
            debug!("watch on unregistered handler {:?} ignored", handler_id);
            return Ok(());
        }
        if on {
            subs.by_intf
                .entry(intf_id.clone())
                .or_default()
                .insert(handler_id);
        } else {
            subs.remove_scoped(handler_id, intf_id);
        }
        Ok(())
    }

    fn is_watching_all(&self, handler_id: HandlerId) -> bool {
        self.lock().global.contains(&handler_id)
    }

    fn is_watching(&self, handler_id: HandlerId, intf_id: &IntfId) -> bool {
        self.lock()
            .by_intf
            .get(intf_id)
            .is_some_and(|set| set.contains(&handler_id))
    }

    /// Handlers eligible for an event on `intf_id`, in registration order
    pub(crate) fn subscribers_for(&self, intf_id: &IntfId) -> Vec<Arc<dyn EthPhyIntfHandler>> {
        let subs = self.lock();
        let mut ids: BTreeSet<HandlerId> = subs.global.clone();
        if let Some(scoped) = subs.by_intf.get(intf_id) {
            ids.extend(scoped.iter().copied());
        }
        ids.iter()
            .filter_map(|id| subs.handlers.get(id).cloned())
            .collect()
    }

    /// Deliver one event to every eligible handler
    ///
    /// Returns the number of handlers called.
    pub(crate) fn dispatch(&self, event: &PhyIntfEvent) -> usize {
        let handlers = self.subscribers_for(&event.intf_id);
        for handler in &handlers {
            match event.kind {
                PhyIntfEventKind::Create => handler.on_eth_phy_intf_create(&event.intf_id),
                PhyIntfEventKind::Delete => handler.on_eth_phy_intf_delete(&event.intf_id),
            }
        }
        handlers.len()
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.lock().handlers.len()
    }
}

/// Handle through which a registered handler manages its subscriptions
///
/// Cloning the handle is cheap; all clones control the same registration.
/// The handle refers to the manager weakly, so a handler may store its own
/// handle. Once the manager is dropped every method is a no-op.
///
/// Dropping the handle does not unregister. The registration, and the
/// handler it holds, lasts until [`Self::unregister`] is called or the
/// manager is dropped; its subscriptions keep firing meanwhile.
#[derive(Clone)]
pub struct HandlerHandle {
    handler_id: HandlerId,
    table: Weak<SubscriptionTable>,
}

impl HandlerHandle {
    pub(crate) fn new(handler_id: HandlerId, table: &Arc<SubscriptionTable>) -> Self {
        Self {
            handler_id,
            table: Arc::downgrade(table),
        }
    }

    /// Registration number of this handler
    pub fn handler_id(&self) -> HandlerId {
        self.handler_id
    }

    /// Turn notification for every interface on or off
    ///
    /// Idempotent: repeating the current value changes nothing.
    pub fn watch_all_eth_phy_intfs(&self, on: bool) {
        if let Some(table) = self.table.upgrade() {
            table.set_watch_all(self.handler_id, on);
        }
    }

    /// Turn notification for one interface on or off
    ///
    /// Independent of [`Self::watch_all_eth_phy_intfs`]. The interface does
    /// not need to exist yet, unless the manager was configured with strict
    /// watch targets, in which case watching a never-seen interface fails
    /// with [`Error::InvalidSubscriptionTarget`]. Idempotent.
    pub fn watch_eth_phy_intf(&self, intf_id: &IntfId, on: bool) -> Result<()> {
        match self.table.upgrade() {
            Some(table) => table.set_watch(self.handler_id, intf_id, on),
            None => Ok(()),
        }
    }

    /// Whether the global flag is on
    pub fn is_watching_all(&self) -> bool {
        self.table
            .upgrade()
            .is_some_and(|table| table.is_watching_all(self.handler_id))
    }

    /// Whether the scoped flag for `intf_id` is on
    pub fn is_watching(&self, intf_id: &IntfId) -> bool {
        self.table
            .upgrade()
            .is_some_and(|table| table.is_watching(self.handler_id, intf_id))
    }

    /// Drop the handler and all of its subscriptions
    pub fn unregister(&self) {
        if let Some(table) = self.table.upgrade() {
            table.unregister(self.handler_id);
        }
    }
}

impl std::fmt::Debug for HandlerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerHandle")
            .field("handler_id", &self.handler_id)
            .finish()
    }
}
