// # ethphyd - Ethernet Physical Interface Daemon
//
// Thin integration layer: everything interface-related lives in ethphy-core
// and the platform crates. The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering platforms and creating the configured one
// 4. Running the interface manager and logging lifecycle events
//
// ## Configuration
//
// - `ETHPHY_PLATFORM_TYPE`: Platform backend (sysfs, memory). Default: sysfs
// - `ETHPHY_SYSFS_ROOT`: Device tree root (for sysfs). Default: /sys/class/net
// - `ETHPHY_POLL_INTERVAL_MS`: Scan interval in ms (for sysfs, 100-60000). Default: 1000
// - `ETHPHY_WATCH`: Comma-separated interfaces to report. Empty reports all
// - `ETHPHY_LOG_LEVEL`: trace, debug, info, warn, error. Default: info
//
// ## Example
//
// ```bash
// export ETHPHY_PLATFORM_TYPE=sysfs
// export ETHPHY_WATCH=eth0,eth1
// export ETHPHY_LOG_LEVEL=debug
//
// ethphyd
// ```

use anyhow::{Context, Result};
use ethphy_core::{
    EthPhyIntfHandler, EthPhyIntfMgr, IntfId, ManagerConfig, PlatformConfig, PlatformRegistry,
};
use std::env;
use std::process::ExitCode;
use std::sync::{Arc, Weak};
use tokio::sync::oneshot;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const DEFAULT_SYSFS_ROOT: &str = "/sys/class/net";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum EthPhyExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<EthPhyExitCode> for ExitCode {
    fn from(code: EthPhyExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    platform_type: String,
    sysfs_root: String,
    poll_interval_ms: u64,
    watch: Vec<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let poll_interval_ms = match lookup("ETHPHY_POLL_INTERVAL_MS") {
            Some(raw) => raw.trim().parse().with_context(|| {
                format!("ETHPHY_POLL_INTERVAL_MS must be a number. Got: {}", raw)
            })?,
            None => DEFAULT_POLL_INTERVAL_MS,
        };

        Ok(Self {
            platform_type: lookup("ETHPHY_PLATFORM_TYPE").unwrap_or_else(|| "sysfs".to_string()),
            sysfs_root: lookup("ETHPHY_SYSFS_ROOT")
                .unwrap_or_else(|| DEFAULT_SYSFS_ROOT.to_string()),
            poll_interval_ms,
            watch: lookup("ETHPHY_WATCH")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            log_level: lookup("ETHPHY_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.platform_type.as_str() {
            "sysfs" | "memory" => {}
            _ => anyhow::bail!(
                "ETHPHY_PLATFORM_TYPE '{}' is not supported. \
                Supported types: sysfs, memory",
                self.platform_type
            ),
        }

        if self.platform_type == "sysfs" {
            if self.sysfs_root.is_empty() {
                anyhow::bail!("ETHPHY_SYSFS_ROOT cannot be empty when ETHPHY_PLATFORM_TYPE=sysfs");
            }

            if !(100..=60_000).contains(&self.poll_interval_ms) {
                anyhow::bail!(
                    "ETHPHY_POLL_INTERVAL_MS must be between 100 and 60000. Got: {}",
                    self.poll_interval_ms
                );
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ETHPHY_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn platform_config(&self) -> PlatformConfig {
        match self.platform_type.as_str() {
            "sysfs" => PlatformConfig::Sysfs {
                root: self.sysfs_root.clone(),
                poll_interval_ms: self.poll_interval_ms,
            },
            _ => PlatformConfig::Memory,
        }
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Logs every interface it is told about, with its current attributes
struct LifecycleLogger {
    mgr: Weak<EthPhyIntfMgr>,
}

impl EthPhyIntfHandler for LifecycleLogger {
    fn on_eth_phy_intf_create(&self, intf_id: &IntfId) {
        let Some(mgr) = self.mgr.upgrade() else {
            return;
        };
        match (mgr.burned_in_eth_addr(intf_id), mgr.link_speed(intf_id)) {
            (Ok(addr), Ok(speed)) => {
                info!("Interface {} created (address {}, speed {})", intf_id, addr, speed)
            }
            // Already gone again, or the platform could not answer
            (Err(e), _) | (_, Err(e)) => info!("Interface {} created ({})", intf_id, e),
        }
    }

    fn on_eth_phy_intf_delete(&self, intf_id: &IntfId) {
        info!("Interface {} deleted", intf_id);
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return EthPhyExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return EthPhyExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return EthPhyExitCode::ConfigError.into();
    }

    info!("Starting ethphyd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return EthPhyExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let mgr = match build_manager(&config) {
            Ok(mgr) => mgr,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return EthPhyExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(&config, mgr).await {
            error!("Daemon error: {:#}", e);
            EthPhyExitCode::RuntimeError
        } else {
            EthPhyExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Create the configured platform and a manager over it
fn build_manager(config: &Config) -> Result<Arc<EthPhyIntfMgr>> {
    let registry = PlatformRegistry::with_builtin();

    #[cfg(feature = "sysfs")]
    {
        info!("Registering sysfs platform");
        ethphy_sysfs::register(&registry);
    }

    info!("Available platforms: {}", registry.list_platforms().join(", "));

    let platform = registry
        .create_platform(&config.platform_config())
        .context("failed to create platform")?;
    info!("Using {} platform", platform.platform_name());

    let (mgr, mut events) = EthPhyIntfMgr::new(Arc::from(platform), ManagerConfig::default())
        .context("failed to create interface manager")?;

    // Nobody consumes monitoring events; drain so the channel never fills
    tokio::spawn(async move { while events.recv().await.is_some() {} });

    Ok(Arc::new(mgr))
}

/// Run the daemon
async fn run_daemon(config: &Config, mgr: Arc<EthPhyIntfMgr>) -> Result<()> {
    let logger = Arc::new(LifecycleLogger {
        mgr: Arc::downgrade(&mgr),
    });
    let handle = mgr.register_handler(logger);

    if config.watch.is_empty() {
        info!("Reporting all interfaces");
        handle.watch_all_eth_phy_intfs(true);
    } else {
        for name in &config.watch {
            info!("Reporting interface: {}", name);
            handle.watch_eth_phy_intf(&IntfId::new(name.clone()), true)?;
        }
    }

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => warn!("Signal handling failed, shutting down: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    mgr.run_with_shutdown(Some(shutdown_rx)).await?;

    for intf_id in mgr.eth_phy_intf_iter() {
        info!("Interface {} present at shutdown", intf_id);
    }
    info!("Shutting down daemon");

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
