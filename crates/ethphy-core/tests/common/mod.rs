//! Test doubles and common utilities for contract tests
//!
//! This module provides a recording handler and helpers to build a manager
//! over the in-memory platform, either driven directly through `apply()` or
//! running on its own task.

#![allow(dead_code)]

use ethphy_core::platform::{MemoryPlatform, PhyIntfEvent, PhyIntfEventKind};
use ethphy_core::{EthAddr, EthPhyIntfHandler, EthPhyIntfMgr, IntfId, LinkSpeed, ManagerConfig, MgrEvent};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// One observed callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(IntfId),
    Delete(IntfId),
}

/// A handler that records every callback in order
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<Call>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Calls observed so far
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls concerning one interface
    pub fn calls_for(&self, intf_id: &IntfId) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| match call {
                Call::Create(id) | Call::Delete(id) => id == intf_id,
            })
            .collect()
    }
}

impl EthPhyIntfHandler for RecordingHandler {
    fn on_eth_phy_intf_create(&self, intf_id: &IntfId) {
        self.calls.lock().unwrap().push(Call::Create(intf_id.clone()));
    }

    fn on_eth_phy_intf_delete(&self, intf_id: &IntfId) {
        self.calls.lock().unwrap().push(Call::Delete(intf_id.clone()));
    }
}

/// Interface name helper: `eth(3)` is `Ethernet3`
pub fn eth(n: u32) -> IntfId {
    IntfId::new(format!("Ethernet{}", n))
}

/// Deterministic address derived from the interface number
pub fn addr(n: u32) -> EthAddr {
    let b = n.to_be_bytes();
    EthAddr::new([0x00, 0x1c, b[0], b[1], b[2], b[3]])
}

/// Create an interface on the platform and tell the manager directly
pub fn create(platform: &MemoryPlatform, mgr: &EthPhyIntfMgr, n: u32) {
    platform
        .create(eth(n), addr(n), LinkSpeed::Gbps10)
        .expect("platform create succeeds");
    mgr.apply(PhyIntfEvent::create(eth(n)));
}

/// Delete an interface on the platform and tell the manager directly
pub fn delete(platform: &MemoryPlatform, mgr: &EthPhyIntfMgr, n: u32) {
    platform.delete(&eth(n)).expect("platform delete succeeds");
    mgr.apply(PhyIntfEvent::delete(eth(n)));
}

/// A manager over a fresh memory platform, driven through `apply()`
pub fn direct_mgr() -> (MemoryPlatform, EthPhyIntfMgr, mpsc::Receiver<MgrEvent>) {
    direct_mgr_with(ManagerConfig::default())
}

pub fn direct_mgr_with(
    config: ManagerConfig,
) -> (MemoryPlatform, EthPhyIntfMgr, mpsc::Receiver<MgrEvent>) {
    let platform = MemoryPlatform::new();
    let (mgr, events) = EthPhyIntfMgr::new(Arc::new(platform.clone()), config)
        .expect("manager construction succeeds");
    (platform, mgr, events)
}

/// A manager applying the platform feed on its own task
pub struct RunningMgr {
    pub platform: MemoryPlatform,
    pub mgr: Arc<EthPhyIntfMgr>,
    pub events: mpsc::Receiver<MgrEvent>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<ethphy_core::Result<()>>>,
}

impl RunningMgr {
    /// Start the manager and wait until it has seeded membership
    pub async fn start(platform: MemoryPlatform) -> Self {
        let (mgr, mut events) =
            EthPhyIntfMgr::new(Arc::new(platform.clone()), ManagerConfig::default())
                .expect("manager construction succeeds");
        let mgr = Arc::new(mgr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task_mgr = mgr.clone();
        let handle =
            tokio::spawn(async move { task_mgr.run_with_shutdown(Some(shutdown_rx)).await });

        let started = wait_for(&mut events, |e| matches!(e, MgrEvent::Started { .. })).await;
        assert!(started.is_some(), "manager did not start");

        Self {
            platform,
            mgr,
            events,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Wait until the manager has applied a change for `intf_id`
    pub async fn applied(&mut self, intf_id: &IntfId, kind: PhyIntfEventKind) {
        let seen = wait_for(&mut self.events, |e| match (e, kind) {
            (MgrEvent::Created { intf_id: id, .. }, PhyIntfEventKind::Create) => id == intf_id,
            (MgrEvent::Deleted { intf_id: id, .. }, PhyIntfEventKind::Delete) => id == intf_id,
            _ => false,
        })
        .await;
        assert!(seen.is_some(), "{:?} for {} not applied", kind, intf_id);
    }

    /// Stop the manager and return the result of its run loop
    pub async fn shutdown(mut self) -> ethphy_core::Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match self.handle.take() {
            Some(handle) => handle.await.expect("manager task does not panic"),
            None => Ok(()),
        }
    }
}

/// Receive monitoring events until one matches, or give up after a second
pub async fn wait_for(
    events: &mut mpsc::Receiver<MgrEvent>,
    mut pred: impl FnMut(&MgrEvent) -> bool,
) -> Option<MgrEvent> {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(1);
    loop {
        match tokio::time::timeout_at(deadline, events.recv()).await {
            Ok(Some(event)) if pred(&event) => return Some(event),
            Ok(Some(_)) => continue,
            Ok(None) | Err(_) => return None,
        }
    }
}
