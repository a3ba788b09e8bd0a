//! Configuration types for the interface manager
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EthPhyConfig {
    /// Platform backend configuration
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Optional manager settings
    #[serde(default)]
    pub manager: ManagerConfig,
}

impl EthPhyConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.platform.validate()?;
        self.manager.validate()?;
        Ok(())
    }
}

/// Platform backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlatformConfig {
    /// In-process simulated platform
    #[default]
    Memory,

    /// Linux sysfs-backed platform
    Sysfs {
        /// Directory holding one entry per network device
        #[serde(default = "default_sysfs_root")]
        root: String,
        /// Interval between membership scans (in milliseconds)
        #[serde(default = "default_poll_interval_ms")]
        poll_interval_ms: u64,
    },

    /// Custom platform
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl PlatformConfig {
    /// Validate the platform configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            PlatformConfig::Memory => Ok(()),
            PlatformConfig::Sysfs {
                root,
                poll_interval_ms,
            } => {
                if root.is_empty() {
                    return Err(crate::Error::config("sysfs root cannot be empty"));
                }
                if *poll_interval_ms == 0 {
                    return Err(crate::Error::config("sysfs poll interval must be > 0"));
                }
                Ok(())
            }
            PlatformConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom platform factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom platform config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the platform type name used for registry lookup
    pub fn type_name(&self) -> &str {
        match self {
            PlatformConfig::Memory => "memory",
            PlatformConfig::Sysfs { .. } => "sysfs",
            PlatformConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Capacity of the monitoring event channel
    ///
    /// When full, new monitoring events are dropped (with a warning log).
    /// Handler dispatch is unaffected.
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Whether handlers may watch interfaces the manager has never seen
    ///
    /// Enabled by default so a handler can wait for an interface to appear.
    #[serde(default = "default_allow_unknown_watch_targets")]
    pub allow_unknown_watch_targets: bool,
}

impl ManagerConfig {
    /// Validate the manager configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event channel capacity must be > 0"));
        }
        Ok(())
    }

    /// Reject scoped watches on never-seen interfaces
    pub fn with_strict_watch_targets(mut self) -> Self {
        self.allow_unknown_watch_targets = false;
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
            allow_unknown_watch_targets: default_allow_unknown_watch_targets(),
        }
    }
}

fn default_sysfs_root() -> String {
    "/sys/class/net".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_allow_unknown_watch_targets() -> bool {
    true
}
