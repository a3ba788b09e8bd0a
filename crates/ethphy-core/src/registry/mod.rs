//! Plugin-based platform registry
//!
//! The registry allows platform backends to be registered dynamically at
//! runtime, avoiding hardcoded if-else chains in the daemon.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ethphy_core::registry::PlatformRegistry;
//! use ethphy_core::config::PlatformConfig;
//!
//! // Registry with the built-in memory platform
//! let registry = PlatformRegistry::with_builtin();
//!
//! // Backend crates register themselves
//! ethphy_sysfs::register(&registry);
//!
//! let platform = registry.create_platform(&PlatformConfig::Memory)?;
//! ```

use crate::config::PlatformConfig;
use crate::error::{Error, Result};
use crate::platform::{EthPhyPlatform, EthPhyPlatformFactory, MemoryPlatformFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Registry of platform factories keyed by type name
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct PlatformRegistry {
    platforms: RwLock<HashMap<String, Box<dyn EthPhyPlatformFactory>>>,
}

impl PlatformRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the platforms built into this crate
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register_platform("memory", Box::new(MemoryPlatformFactory));
        registry
    }

    /// Register a platform factory
    ///
    /// Registering a name twice replaces the earlier factory.
    pub fn register_platform(
        &self,
        name: impl Into<String>,
        factory: Box<dyn EthPhyPlatformFactory>,
    ) {
        let mut platforms = self.platforms.write().unwrap_or_else(PoisonError::into_inner);
        platforms.insert(name.into(), factory);
    }

    /// Create a platform from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn EthPhyPlatform>)`: Created platform instance
    /// - `Err(Error)`: If the platform type is not registered or creation fails
    pub fn create_platform(&self, config: &PlatformConfig) -> Result<Box<dyn EthPhyPlatform>> {
        config.validate()?;

        let platform_type = config.type_name();
        let platforms = self.platforms.read().unwrap_or_else(PoisonError::into_inner);

        let factory = platforms
            .get(platform_type)
            .ok_or_else(|| Error::config(format!("Unknown platform type: {}", platform_type)))?;

        factory.create(config)
    }

    /// List all registered platform types
    pub fn list_platforms(&self) -> Vec<String> {
        let platforms = self.platforms.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = platforms.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a platform type is registered
    pub fn has_platform(&self, name: &str) -> bool {
        let platforms = self.platforms.read().unwrap_or_else(PoisonError::into_inner);
        platforms.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingFactory;

    impl EthPhyPlatformFactory for FailingFactory {
        fn create(&self, _config: &PlatformConfig) -> Result<Box<dyn EthPhyPlatform>> {
            Err(Error::unavailable("agent not reachable"))
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = PlatformRegistry::new();

        // Initially empty
        assert!(!registry.has_platform("eos"));

        registry.register_platform("eos", Box::new(FailingFactory));

        assert!(registry.has_platform("eos"));
        assert_eq!(registry.list_platforms(), vec!["eos".to_string()]);
    }

    #[test]
    fn test_builtin_memory() {
        let registry = PlatformRegistry::with_builtin();
        let platform = registry.create_platform(&PlatformConfig::Memory).unwrap();
        assert_eq!(platform.platform_name(), "memory");
    }

    #[test]
    fn test_unknown_type() {
        let registry = PlatformRegistry::with_builtin();
        let config = PlatformConfig::Sysfs {
            root: "/sys/class/net".to_string(),
            poll_interval_ms: 1000,
        };
        assert!(matches!(
            registry.create_platform(&config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_custom_factory_error_propagates() {
        let registry = PlatformRegistry::new();
        registry.register_platform("eos", Box::new(FailingFactory));
        let config = PlatformConfig::Custom {
            factory: "eos".to_string(),
            config: serde_json::json!({ "socket": "/var/run/eos" }),
        };
        assert!(matches!(
            registry.create_platform(&config),
            Err(Error::Unavailable(_))
        ));
    }
}
