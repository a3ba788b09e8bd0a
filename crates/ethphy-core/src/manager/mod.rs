//! Ethernet physical interface manager
//!
//! The EthPhyIntfMgr is responsible for:
//! - Tracking which physical interfaces currently exist
//! - Answering attribute queries for existing interfaces
//! - Dispatching create/delete notifications to subscribed handlers
//! - Handing out snapshot iterators over the membership
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ EthPhyPlatform│─── PhyIntfEvent ───┐
//! └───────────────┘                    │
//!         ▲                            ▼
//!         │                   ┌────────────────┐
//!         │   attribute reads │ EthPhyIntfMgr  │
//!         └───────────────────┤  (membership)  │
//!                             └────────────────┘
//!                                      │
//!              ┌───────────────────────┼───────────────────────┐
//!              │                       │                       │
//!              ▼                       ▼                       ▼
//!     ┌────────────────┐     ┌──────────────────┐     ┌──────────────┐
//!     │    Handlers    │     │ EthPhyIntfIter   │     │   MgrEvent   │
//!     │   (dispatch)   │     │   (snapshot)     │     │  (monitor)   │
//!     └────────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! ## Event Flow
//!
//! 1. Platform reports a create or delete
//! 2. Membership is updated under the writer lock
//! 3. Eligible handlers are called, in order, still under the writer lock
//! 4. A monitoring event is emitted
//!
//! The writer lock serializes steps 2 and 3 across events, so each handler
//! sees events in exactly the order they were applied. Readers take only
//! the membership lock and never wait on handler callbacks.

pub(crate) mod membership;
pub mod iter;

pub use iter::EthPhyIntfIter;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::config::ManagerConfig;
use crate::counter_mgr::EthPhyIntfCounterMgr;
use crate::error::{Error, Result};
use crate::notify::{EthPhyIntfHandler, HandlerHandle, SubscriptionTable};
use crate::platform::{EthPhyPlatform, PhyIntfEvent, PhyIntfEventKind};
use crate::types::{EthAddr, IntfId, LinkSpeed};
use membership::Membership;

/// Events emitted by the manager for monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MgrEvent {
    /// Manager started with the given number of existing interfaces
    Started { interfaces: usize },

    /// Interface created and handlers notified
    Created { intf_id: IntfId, handlers: usize },

    /// Interface deleted and handlers notified
    Deleted { intf_id: IntfId, handlers: usize },

    /// Event dropped: create for a member or delete for a non-member
    Ignored {
        intf_id: IntfId,
        kind: PhyIntfEventKind,
    },

    /// Manager stopped
    Stopped { reason: String },
}

/// Ethernet physical interface manager
///
/// One instance per platform connection. The manager is an observer of the
/// platform: membership changes only through events the platform reports,
/// and attribute queries are forwarded to the platform on every call.
///
/// ## Lifecycle
///
/// 1. Create with [`EthPhyIntfMgr::new()`]
/// 2. Register handlers with [`EthPhyIntfMgr::register_handler()`]
/// 3. Start with [`EthPhyIntfMgr::run()`]; it seeds membership from the
///    platform, then applies the platform feed until shutdown
///
/// A manager runs at most once. Seeding is silent, so it only happens
/// before any event has been applied from the feed.
///
/// ## Threading
///
/// Queries may be issued from any thread while `run()` is applying events.
pub struct EthPhyIntfMgr {
    /// Source of truth for interfaces
    platform: Arc<dyn EthPhyPlatform>,

    /// Interfaces known to exist
    membership: Arc<Membership>,

    /// Handler registrations and their scopes
    subscriptions: Arc<SubscriptionTable>,

    /// Serializes membership updates together with their dispatch
    writer: Mutex<()>,

    /// Set once `run` has been entered
    started: AtomicBool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<MgrEvent>,
}

impl EthPhyIntfMgr {
    /// Create a new manager
    ///
    /// # Returns
    ///
    /// A tuple of (manager, event_receiver) where event_receiver yields
    /// monitoring events
    pub fn new(
        platform: Arc<dyn EthPhyPlatform>,
        config: ManagerConfig,
    ) -> Result<(Self, mpsc::Receiver<MgrEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let (membership, known_targets) = if config.allow_unknown_watch_targets {
            (Arc::new(Membership::new()), None)
        } else {
            let membership = Arc::new(Membership::tracking_seen());
            (membership.clone(), Some(membership))
        };

        let mgr = Self {
            platform,
            membership,
            subscriptions: Arc::new(SubscriptionTable::new(known_targets)),
            writer: Mutex::new(()),
            started: AtomicBool::new(false),
            event_tx: tx,
        };

        Ok((mgr, rx))
    }

    /// Iterate over the interfaces that exist right now
    ///
    /// The returned iterator works on a copy of the membership taken here.
    pub fn eth_phy_intf_iter(&self) -> EthPhyIntfIter {
        EthPhyIntfIter::new(self.membership.snapshot())
    }

    /// Returns true if the interface currently exists
    pub fn exists(&self, intf_id: &IntfId) -> bool {
        self.membership.contains(intf_id)
    }

    /// Number of interfaces that currently exist
    pub fn len(&self) -> usize {
        self.membership.len()
    }

    /// Returns true if no interface currently exists
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the "burned in" address of the interface
    ///
    /// Fails with [`Error::NotFound`] if the interface does not exist.
    pub fn burned_in_eth_addr(&self, intf_id: &IntfId) -> Result<EthAddr> {
        self.ensure_exists(intf_id)?;
        self.platform.burned_in_eth_addr(intf_id)
    }

    /// Returns the operational link speed
    ///
    /// Read from the platform on every call; the speed may change while
    /// the interface exists. Fails with [`Error::NotFound`] if the
    /// interface does not exist.
    pub fn link_speed(&self, intf_id: &IntfId) -> Result<LinkSpeed> {
        self.ensure_exists(intf_id)?;
        self.platform.link_speed(intf_id)
    }

    /// Counter query service sharing this manager's membership
    pub fn counter_mgr(&self) -> EthPhyIntfCounterMgr {
        EthPhyIntfCounterMgr::new(self.platform.clone(), self.membership.clone())
    }

    /// Register a handler; all of its subscriptions start off
    pub fn register_handler(&self, handler: Arc<dyn EthPhyIntfHandler>) -> HandlerHandle {
        let handler_id = self.subscriptions.register(handler);
        debug!("Registered handler {:?}", handler_id);
        HandlerHandle::new(handler_id, &self.subscriptions)
    }

    /// Number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.subscriptions.handler_count()
    }

    fn ensure_exists(&self, intf_id: &IntfId) -> Result<()> {
        if self.membership.contains(intf_id) {
            Ok(())
        } else {
            Err(Error::not_found(intf_id))
        }
    }

    /// Seed membership from the platform's current inventory
    ///
    /// Seeded interfaces are added without notifying handlers. Only valid
    /// before the feed is applied: a seeded interface whose create is still
    /// queued would otherwise never reach its subscribers.
    async fn sync(&self) -> Result<usize> {
        let intfs = self.platform.current().await?;

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let added = intfs
            .iter()
            .filter(|intf_id| self.membership.insert(intf_id))
            .count();
        debug!("Seeded {} interface(s) from {}", added, self.platform.platform_name());
        Ok(added)
    }

    /// Apply one platform event
    ///
    /// Updates membership and dispatches to eligible handlers before
    /// returning. A create for an interface that already exists, or a
    /// delete for one that does not, is ignored so that handlers never see
    /// a duplicate create or an unmatched delete.
    ///
    /// # Returns
    ///
    /// `true` if the event changed membership
    pub fn apply(&self, event: PhyIntfEvent) -> bool {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let changed = match event.kind {
            PhyIntfEventKind::Create => self.membership.insert(&event.intf_id),
            PhyIntfEventKind::Delete => self.membership.remove(&event.intf_id),
        };

        if !changed {
            debug!("Ignoring {:?} for {}", event.kind, event.intf_id);
            self.emit_event(MgrEvent::Ignored {
                intf_id: event.intf_id,
                kind: event.kind,
            });
            return false;
        }

        let handlers = self.subscriptions.dispatch(&event);

        match event.kind {
            PhyIntfEventKind::Create => {
                info!("Interface {} created ({} handler(s))", event.intf_id, handlers);
                self.emit_event(MgrEvent::Created {
                    intf_id: event.intf_id,
                    handlers,
                });
            }
            PhyIntfEventKind::Delete => {
                info!("Interface {} deleted ({} handler(s))", event.intf_id, handlers);
                self.emit_event(MgrEvent::Deleted {
                    intf_id: event.intf_id,
                    handlers,
                });
            }
        }

        true
    }

    /// Run the manager
    ///
    /// Seeds membership, then applies platform events until a shutdown
    /// signal (Ctrl-C) is received.
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::invalid_input("interface manager already started"));
        }

        // Open the feed before reading the inventory so nothing falls in
        // between; replayed creates for seeded interfaces are ignored.
        let mut feed = self.platform.watch();
        self.sync().await?;

        info!(
            "Interface manager started on {} platform with {} interface(s)",
            self.platform.platform_name(),
            self.len()
        );
        self.emit_event(MgrEvent::Started {
            interfaces: self.len(),
        });

        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for provided shutdown signal
            loop {
                tokio::select! {
                    Some(event) = feed.next() => {
                        self.apply(event);
                    }

                    _ = &mut rx => {
                        info!("Shutdown signal received");
                        break;
                    }
                }
            }
        } else {
            // Production mode: wait for SIGINT
            loop {
                tokio::select! {
                    Some(event) = feed.next() => {
                        self.apply(event);
                    }

                    _ = tokio::signal::ctrl_c() => {
                        info!("Shutdown signal received");
                        break;
                    }
                }
            }
        }

        self.emit_event(MgrEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
        info!("Interface manager stopped");

        Ok(())
    }

    fn emit_event(&self, event: MgrEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!(
                "Monitoring channel full, dropping event. Consider increasing event_channel_capacity."
            );
        }
    }

    /// Run the manager until `shutdown_rx` fires
    ///
    /// Lets the caller own signal handling. With `None` this behaves like
    /// `run()`.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }
}
