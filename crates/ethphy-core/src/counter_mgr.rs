//! Ethernet interface counter manager
//!
//! Inspects interface counters and statistics. The counter manager shares
//! the membership set with [`crate::EthPhyIntfMgr`] but nothing else, so it
//! can be polled at its own cadence from any thread.
//!
//! Every query goes to the platform. Nothing is cached: counters move
//! continuously and a cached value would corrupt rate calculations.

use std::sync::Arc;

use tracing::warn;

use crate::error::{Error, Result};
use crate::manager::membership::Membership;
use crate::platform::EthPhyPlatform;
use crate::types::{EthPhyIntfBinCounters, EthPhyIntfCounters, IntfId};

/// Read-only counter query service
#[derive(Clone)]
pub struct EthPhyIntfCounterMgr {
    platform: Arc<dyn EthPhyPlatform>,
    membership: Arc<Membership>,
}

impl EthPhyIntfCounterMgr {
    pub(crate) fn new(platform: Arc<dyn EthPhyPlatform>, membership: Arc<Membership>) -> Self {
        Self {
            platform,
            membership,
        }
    }

    /// Get the current counters of the given Ethernet interface
    pub fn counters(&self, intf_id: &IntfId) -> Result<EthPhyIntfCounters> {
        self.ensure_exists(intf_id)?;
        self.platform
            .counters(intf_id)
            .inspect_err(|e| self.log_failure("counters", intf_id, e))
    }

    /// Get the current bin counters of the given Ethernet interface
    pub fn bin_counters(&self, intf_id: &IntfId) -> Result<EthPhyIntfBinCounters> {
        self.ensure_exists(intf_id)?;
        self.platform
            .bin_counters(intf_id)
            .inspect_err(|e| self.log_failure("bin counters", intf_id, e))
    }

    fn ensure_exists(&self, intf_id: &IntfId) -> Result<()> {
        if self.membership.contains(intf_id) {
            Ok(())
        } else {
            Err(Error::not_found(intf_id))
        }
    }

    fn log_failure(&self, what: &str, intf_id: &IntfId, error: &Error) {
        if let Error::Unavailable(reason) = error {
            warn!(
                "Failed to read {} for {} from {}: {}",
                what,
                intf_id,
                self.platform.platform_name(),
                reason
            );
        }
    }
}

impl std::fmt::Debug for EthPhyIntfCounterMgr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthPhyIntfCounterMgr")
            .field("platform", &self.platform.platform_name())
            .finish()
    }
}
