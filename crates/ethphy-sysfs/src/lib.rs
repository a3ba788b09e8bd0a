// # Sysfs Platform
//
// This crate provides a platform backend reading the Linux network device
// tree (`/sys/class/net` by default).
//
// ## Layout
//
// ```text
// <root>/<name>/device            present only for hardware-backed devices
// <root>/<name>/address           hardware address
// <root>/<name>/speed             link speed in Mb/s (-1 or EINVAL when down)
// <root>/<name>/statistics/<ctr>  one counter per file
// ```
//
// Entries without `device` (loopback, bridges, tunnels) are not physical
// interfaces and are never reported.
//
// ## Architecture
//
// The kernel offers no change notification on this tree, so `watch()`
// scans it at a configurable interval and emits create/delete for the
// difference. The first scan reports everything it finds; the manager
// drops creates for interfaces it already seeded.
//
// ## Limitations
//
// - `address` is the current address, which differs from the burned-in
//   one only if an administrator overrode it.
// - Frame-size histograms are not exposed; bin counter queries fail with
//   `Error::Unavailable`.

use ethphy_core::config::PlatformConfig;
use ethphy_core::platform::{
    EthPhyPlatform, EthPhyPlatformFactory, PhyIntfEvent, PhyIntfEventStream,
};
use ethphy_core::{
    EthAddr, EthPhyIntfBinCounters, EthPhyIntfCounters, Error, IntfId, LinkSpeed,
    PlatformRegistry, Result,
};

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

/// Default device tree root
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/net";

/// Default interval between membership scans
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Platform backed by the sysfs network device tree
#[derive(Debug, Clone)]
pub struct SysfsPlatform {
    /// Directory holding one entry per network device
    root: PathBuf,

    /// Interval between membership scans
    poll_interval: Duration,
}

impl SysfsPlatform {
    /// Create a platform over `root` with the default scan interval
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_interval(root, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
    }

    /// Create with a custom scan interval
    pub fn with_interval(root: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            root: root.into(),
            poll_interval,
        }
    }

    fn intf_dir(&self, intf_id: &IntfId) -> Result<PathBuf> {
        // Names come from the platform, but keep lookups inside the tree
        let name = intf_id.as_str();
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(Error::not_found(intf_id));
        }
        let dir = self.root.join(name);
        if dir.join("device").exists() {
            Ok(dir)
        } else {
            Err(Error::not_found(intf_id))
        }
    }

    fn read_attr(&self, intf_id: &IntfId, attr: &str) -> Result<String> {
        let path = self.intf_dir(intf_id)?.join(attr);
        std::fs::read_to_string(&path)
            .map(|s| s.trim().to_string())
            .map_err(|e| read_error(intf_id, &path, e))
    }
}

fn read_error(intf_id: &IntfId, path: &Path, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::not_found(intf_id)
    } else {
        Error::unavailable(format!("failed to read {}: {}", path.display(), err))
    }
}

/// List hardware-backed devices under `root`
async fn scan(root: &Path) -> io::Result<BTreeSet<IntfId>> {
    let mut intfs = BTreeSet::new();
    let mut entries = tokio::fs::read_dir(root).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !tokio::fs::try_exists(entry.path().join("device")).await? {
            continue;
        }
        // A lossy name would not lead back to the entry
        match entry.file_name().into_string() {
            Ok(name) => {
                intfs.insert(IntfId::new(name));
            }
            Err(raw) => debug!("Skipping device with non-UTF-8 name {:?}", raw),
        }
    }
    Ok(intfs)
}

/// Read one statistics file, treating a missing counter as zero
fn read_stat(stats_dir: &Path, name: &str) -> u64 {
    std::fs::read_to_string(stats_dir.join(name))
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

#[async_trait::async_trait]
impl EthPhyPlatform for SysfsPlatform {
    async fn current(&self) -> Result<Vec<IntfId>> {
        let intfs = scan(&self.root).await.map_err(|e| {
            Error::unavailable(format!("failed to scan {}: {}", self.root.display(), e))
        })?;
        Ok(intfs.into_iter().collect())
    }

    fn watch(&self) -> PhyIntfEventStream {
        let (tx, rx) = mpsc::unbounded_channel();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("sysfs watch requested outside a tokio runtime; feed is empty");
            return Box::pin(UnboundedReceiverStream::new(rx));
        };

        let root = self.root.clone();
        let poll_interval = self.poll_interval;

        runtime.spawn(async move {
            info!(
                "Starting sysfs interface monitoring (root={}, interval={:?})",
                root.display(),
                poll_interval
            );

            let mut known: BTreeSet<IntfId> = BTreeSet::new();
            let mut ticker = tokio::time::interval(poll_interval);

            loop {
                tokio::select! {
                    _ = tx.closed() => {
                        debug!("sysfs feed dropped, stopping monitoring");
                        break;
                    }
                    _ = ticker.tick() => {}
                }

                let found = match scan(&root).await {
                    Ok(found) => found,
                    Err(e) => {
                        warn!("Failed to scan {}: {}", root.display(), e);
                        continue;
                    }
                };

                for gone in known.difference(&found) {
                    let _ = tx.send(PhyIntfEvent::delete(gone.clone()));
                }
                for new in found.difference(&known) {
                    let _ = tx.send(PhyIntfEvent::create(new.clone()));
                }
                known = found;
            }
        });

        Box::pin(UnboundedReceiverStream::new(rx))
    }

    fn burned_in_eth_addr(&self, intf_id: &IntfId) -> Result<EthAddr> {
        let raw = self.read_attr(intf_id, "address")?;
        raw.parse().map_err(|_| {
            Error::unavailable(format!("unparseable address for {}: {}", intf_id, raw))
        })
    }

    fn link_speed(&self, intf_id: &IntfId) -> Result<LinkSpeed> {
        let dir = self.intf_dir(intf_id)?;
        // The kernel refuses to read speed on a link that is down
        match std::fs::read_to_string(dir.join("speed")) {
            Ok(raw) => Ok(raw
                .trim()
                .parse::<i64>()
                .map(LinkSpeed::from_mbps)
                .unwrap_or(LinkSpeed::Unknown)),
            Err(_) => Ok(LinkSpeed::Unknown),
        }
    }

    fn counters(&self, intf_id: &IntfId) -> Result<EthPhyIntfCounters> {
        let stats = self.intf_dir(intf_id)?.join("statistics");
        if !stats.is_dir() {
            return Err(Error::unavailable(format!(
                "no statistics directory for {}",
                intf_id
            )));
        }

        // sysfs keeps a single aggregate collision count
        Ok(EthPhyIntfCounters {
            single_collision_frames: read_stat(&stats, "collisions"),
            fcs_errors: read_stat(&stats, "rx_crc_errors"),
            alignment_errors: read_stat(&stats, "rx_frame_errors"),
            late_collisions: read_stat(&stats, "tx_window_errors"),
            excessive_collisions: read_stat(&stats, "tx_aborted_errors"),
            internal_mac_transmit_errors: read_stat(&stats, "tx_fifo_errors"),
            carrier_sense_errors: read_stat(&stats, "tx_carrier_errors"),
            internal_mac_receive_errors: read_stat(&stats, "rx_fifo_errors"),
            frame_too_longs: read_stat(&stats, "rx_length_errors"),
            ..EthPhyIntfCounters::zeroed()
        })
    }

    fn bin_counters(&self, intf_id: &IntfId) -> Result<EthPhyIntfBinCounters> {
        self.intf_dir(intf_id)?;
        Err(Error::unavailable(
            "frame-size histograms are not exposed by sysfs",
        ))
    }

    fn platform_name(&self) -> &'static str {
        "sysfs"
    }
}

/// Factory for creating sysfs platforms
pub struct SysfsPlatformFactory;

impl EthPhyPlatformFactory for SysfsPlatformFactory {
    fn create(&self, config: &PlatformConfig) -> Result<Box<dyn EthPhyPlatform>> {
        match config {
            PlatformConfig::Sysfs {
                root,
                poll_interval_ms,
            } => Ok(Box::new(SysfsPlatform::with_interval(
                root,
                Duration::from_millis(*poll_interval_ms),
            ))),
            _ => Err(Error::config("Invalid config for sysfs platform")),
        }
    }
}

/// Register the sysfs platform with a registry
pub fn register(registry: &PlatformRegistry) {
    registry.register_platform("sysfs", Box::new(SysfsPlatformFactory));
}
