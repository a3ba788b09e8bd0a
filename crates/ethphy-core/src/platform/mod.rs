// # Platform Trait
//
// Defines the interface to the system that owns physical interfaces.
//
// The platform is the source of truth. It creates and deletes interfaces,
// assigns their identifiers and holds their attributes and counters. The
// manager only observes it: it consumes the create/delete feed and calls
// the synchronous accessors on demand.
//
// ## Implementations
//
// - In-process simulation: [`MemoryPlatform`]
// - Linux sysfs: `ethphy-sysfs` crate
//
// ## Usage
//
// ```rust,ignore
// use ethphy_core::EthPhyPlatform;
// use tokio_stream::StreamExt;
//
// let platform = /* EthPhyPlatform implementation */;
//
// // Inventory at startup
// let intfs = platform.current().await?;
//
// // Lifecycle feed
// let mut events = platform.watch();
// while let Some(event) = events.next().await {
//     println!("{:?}", event);
// }
// ```

pub mod memory;

pub use memory::{MemoryPlatform, MemoryPlatformFactory};

use crate::types::{EthAddr, EthPhyIntfBinCounters, EthPhyIntfCounters, IntfId, LinkSpeed};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// Kind of lifecycle event reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhyIntfEventKind {
    Create,
    Delete,
}

/// A lifecycle event for one physical interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhyIntfEvent {
    pub kind: PhyIntfEventKind,
    pub intf_id: IntfId,
}

impl PhyIntfEvent {
    /// An interface came into existence
    pub fn create(intf_id: IntfId) -> Self {
        Self {
            kind: PhyIntfEventKind::Create,
            intf_id,
        }
    }

    /// An interface went away
    pub fn delete(intf_id: IntfId) -> Self {
        Self {
            kind: PhyIntfEventKind::Delete,
            intf_id,
        }
    }
}

/// Stream of lifecycle events returned by [`EthPhyPlatform::watch`]
pub type PhyIntfEventStream = Pin<Box<dyn Stream<Item = PhyIntfEvent> + Send + 'static>>;

/// Trait for platform implementations
///
/// Implementations must be thread-safe; the accessors are called from
/// arbitrary caller threads while the feed is consumed on the manager's task.
///
/// Accessors are synchronous and may block on the platform call itself.
/// Cancellation and timeouts belong to the implementation. A failure to
/// reach the platform must surface as [`crate::Error::Unavailable`]; an
/// interface unknown to the platform as [`crate::Error::NotFound`].
#[async_trait]
pub trait EthPhyPlatform: Send + Sync {
    /// List the physical interfaces that exist right now
    async fn current(&self) -> Result<Vec<IntfId>, crate::Error>;

    /// Watch for interface creation and deletion
    ///
    /// Each call opens an independent feed. Events are delivered in the
    /// order the platform applied them. Dropping the stream releases it.
    fn watch(&self) -> PhyIntfEventStream;

    /// Factory-assigned hardware address
    fn burned_in_eth_addr(&self, intf_id: &IntfId) -> Result<EthAddr, crate::Error>;

    /// Current operational link speed
    fn link_speed(&self, intf_id: &IntfId) -> Result<LinkSpeed, crate::Error>;

    /// Current Ethernet statistics
    fn counters(&self, intf_id: &IntfId) -> Result<EthPhyIntfCounters, crate::Error>;

    /// Current frame-size histograms
    fn bin_counters(&self, intf_id: &IntfId) -> Result<EthPhyIntfBinCounters, crate::Error>;

    /// Short name used in logs and the registry
    fn platform_name(&self) -> &'static str;
}

/// Helper trait for constructing platforms from configuration
pub trait EthPhyPlatformFactory: Send + Sync {
    /// Create a platform instance from configuration
    fn create(
        &self,
        config: &crate::config::PlatformConfig,
    ) -> Result<Box<dyn EthPhyPlatform>, crate::Error>;
}
