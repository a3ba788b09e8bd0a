// # ethphy-core
//
// Core library for the Ethernet physical interface manager.
//
// ## Architecture Overview
//
// - **EthPhyPlatform**: Trait for the system that owns physical interfaces
// - **EthPhyIntfMgr**: Membership registry, attribute queries, event dispatch
// - **EthPhyIntfCounterMgr**: Counter queries, independent of membership changes
// - **EthPhyIntfHandler**: Observer callbacks for create/delete
// - **EthPhyIntfIter**: Snapshot iteration over current interfaces
// - **PlatformRegistry**: Plugin-based registry for platform backends
//
// ## Design Principles
//
// 1. **Observer, not owner**: membership changes only through platform events
// 2. **Fresh reads**: attributes and counters are fetched on every query
// 3. **Ordered dispatch**: each handler sees events in the order applied
// 4. **Explicit instances**: no process-wide singleton; construct and pass

pub mod config;
pub mod counter_mgr;
pub mod error;
pub mod manager;
pub mod notify;
pub mod platform;
pub mod registry;
pub mod types;

// Re-export core types for convenience
pub use config::{EthPhyConfig, ManagerConfig, PlatformConfig};
pub use counter_mgr::EthPhyIntfCounterMgr;
pub use error::{Error, Result};
pub use manager::{EthPhyIntfIter, EthPhyIntfMgr, MgrEvent};
pub use notify::{EthPhyIntfHandler, HandlerHandle, HandlerId};
pub use platform::{
    EthPhyPlatform, EthPhyPlatformFactory, MemoryPlatform, PhyIntfEvent, PhyIntfEventKind,
};
pub use registry::PlatformRegistry;
pub use types::{EthAddr, EthPhyIntfBinCounters, EthPhyIntfCounters, FrameSizeBins, IntfId, LinkSpeed};
