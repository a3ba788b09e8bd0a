// # Memory Platform
//
// In-process implementation of EthPhyPlatform.
//
// ## Purpose
//
// Simulates the system that owns physical interfaces: interfaces are
// created and deleted by calling methods on the platform, and every open
// feed sees the change in order. Useful for testing, for applications that
// embed the manager, and for running the daemon without hardware.
//
// ## Fault Injection
//
// `set_available(false)` makes every accessor fail with
// `Error::Unavailable`, as a disconnected agent would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::{EthPhyPlatform, EthPhyPlatformFactory, PhyIntfEvent, PhyIntfEventStream};
use crate::config::PlatformConfig;
use crate::types::{EthAddr, EthPhyIntfBinCounters, EthPhyIntfCounters, IntfId, LinkSpeed};
use crate::Error;

#[derive(Debug, Clone)]
struct SimulatedIntf {
    eth_addr: EthAddr,
    link_speed: LinkSpeed,
    counters: EthPhyIntfCounters,
    bin_counters: EthPhyIntfBinCounters,
}

#[derive(Default)]
struct Inner {
    intfs: HashMap<IntfId, SimulatedIntf>,
    feeds: Vec<mpsc::UnboundedSender<PhyIntfEvent>>,
}

impl Inner {
    fn publish(&mut self, event: PhyIntfEvent) {
        self.feeds.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// In-memory platform implementation
///
/// Cloning yields another handle onto the same simulated system.
///
/// # Example
///
/// ```rust,no_run
/// use ethphy_core::platform::MemoryPlatform;
/// use ethphy_core::{EthAddr, IntfId, LinkSpeed};
///
/// let platform = MemoryPlatform::new();
/// platform
///     .create(IntfId::new("Ethernet1"), EthAddr::new([0, 0x1c, 0x73, 0, 0, 1]), LinkSpeed::Gbps10)
///     .unwrap();
/// ```
#[derive(Clone, Default)]
pub struct MemoryPlatform {
    inner: Arc<Mutex<Inner>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryPlatform {
    /// Create a platform with no interfaces
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), Error> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::unavailable("memory platform marked unavailable"));
        }
        Ok(())
    }

    fn with_intf<T>(
        &self,
        intf_id: &IntfId,
        f: impl FnOnce(&SimulatedIntf) -> T,
    ) -> Result<T, Error> {
        self.check_available()?;
        let guard = self.lock();
        guard
            .intfs
            .get(intf_id)
            .map(f)
            .ok_or_else(|| Error::not_found(intf_id))
    }

    fn with_intf_mut(
        &self,
        intf_id: &IntfId,
        f: impl FnOnce(&mut SimulatedIntf),
    ) -> Result<(), Error> {
        let mut guard = self.lock();
        let intf = guard
            .intfs
            .get_mut(intf_id)
            .ok_or_else(|| Error::not_found(intf_id))?;
        f(intf);
        Ok(())
    }

    /// Bring a new physical interface into existence
    pub fn create(
        &self,
        intf_id: IntfId,
        eth_addr: EthAddr,
        link_speed: LinkSpeed,
    ) -> Result<(), Error> {
        let mut guard = self.lock();
        if guard.intfs.contains_key(&intf_id) {
            return Err(Error::invalid_input(format!(
                "interface {} already exists",
                intf_id
            )));
        }
        guard.intfs.insert(
            intf_id.clone(),
            SimulatedIntf {
                eth_addr,
                link_speed,
                counters: EthPhyIntfCounters::zeroed(),
                bin_counters: EthPhyIntfBinCounters::zeroed(),
            },
        );
        guard.publish(PhyIntfEvent::create(intf_id));
        Ok(())
    }

    /// Remove a physical interface
    pub fn delete(&self, intf_id: &IntfId) -> Result<(), Error> {
        let mut guard = self.lock();
        if guard.intfs.remove(intf_id).is_none() {
            return Err(Error::not_found(intf_id));
        }
        guard.publish(PhyIntfEvent::delete(intf_id.clone()));
        Ok(())
    }

    /// Publish a raw event without touching the simulated state
    ///
    /// Lets tests replay duplicate or out-of-order feeds.
    pub fn inject(&self, event: PhyIntfEvent) {
        self.lock().publish(event);
    }

    /// Renegotiate the link speed
    pub fn set_link_speed(&self, intf_id: &IntfId, link_speed: LinkSpeed) -> Result<(), Error> {
        self.with_intf_mut(intf_id, |intf| intf.link_speed = link_speed)
    }

    /// Replace the statistics reported for an interface
    pub fn set_counters(
        &self,
        intf_id: &IntfId,
        counters: EthPhyIntfCounters,
    ) -> Result<(), Error> {
        self.with_intf_mut(intf_id, |intf| intf.counters = counters)
    }

    /// Replace the histograms reported for an interface
    pub fn set_bin_counters(
        &self,
        intf_id: &IntfId,
        bin_counters: EthPhyIntfBinCounters,
    ) -> Result<(), Error> {
        self.with_intf_mut(intf_id, |intf| intf.bin_counters = bin_counters)
    }

    /// Make accessors succeed (`true`) or fail as unreachable (`false`)
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of feeds still attached
    pub fn feed_count(&self) -> usize {
        let mut guard = self.lock();
        guard.feeds.retain(|tx| !tx.is_closed());
        guard.feeds.len()
    }
}

#[async_trait]
impl EthPhyPlatform for MemoryPlatform {
    async fn current(&self) -> Result<Vec<IntfId>, Error> {
        self.check_available()?;
        let guard = self.lock();
        let mut intfs: Vec<IntfId> = guard.intfs.keys().cloned().collect();
        intfs.sort();
        Ok(intfs)
    }

    fn watch(&self) -> PhyIntfEventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().feeds.push(tx);
        Box::pin(UnboundedReceiverStream::new(rx))
    }

    fn burned_in_eth_addr(&self, intf_id: &IntfId) -> Result<EthAddr, Error> {
        self.with_intf(intf_id, |intf| intf.eth_addr)
    }

    fn link_speed(&self, intf_id: &IntfId) -> Result<LinkSpeed, Error> {
        self.with_intf(intf_id, |intf| intf.link_speed)
    }

    fn counters(&self, intf_id: &IntfId) -> Result<EthPhyIntfCounters, Error> {
        self.with_intf(intf_id, |intf| EthPhyIntfCounters {
            sampled_at: Utc::now(),
            ..intf.counters.clone()
        })
    }

    fn bin_counters(&self, intf_id: &IntfId) -> Result<EthPhyIntfBinCounters, Error> {
        self.with_intf(intf_id, |intf| EthPhyIntfBinCounters {
            sampled_at: Utc::now(),
            ..intf.bin_counters.clone()
        })
    }

    fn platform_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for creating memory platforms
pub struct MemoryPlatformFactory;

impl EthPhyPlatformFactory for MemoryPlatformFactory {
    fn create(&self, config: &PlatformConfig) -> Result<Box<dyn EthPhyPlatform>, Error> {
        match config {
            PlatformConfig::Memory => Ok(Box::new(MemoryPlatform::new())),
            _ => Err(Error::config("Invalid config for memory platform")),
        }
    }
}
