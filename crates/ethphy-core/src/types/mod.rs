// # Interface Types
//
// Value types shared by the manager, the counter service and platforms.
//
// - [`IntfId`]: opaque, ordered key naming one physical interface
// - [`EthAddr`]: burned-in hardware address
// - [`LinkSpeed`]: operational link speed
// - [`EthPhyIntfCounters`] / [`EthPhyIntfBinCounters`]: counter snapshots

pub mod counters;
pub mod eth_addr;
pub mod intf_id;
pub mod link_speed;

pub use counters::{EthPhyIntfBinCounters, EthPhyIntfCounters, FrameSizeBins};
pub use eth_addr::EthAddr;
pub use intf_id::IntfId;
pub use link_speed::LinkSpeed;
