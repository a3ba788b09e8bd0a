//! Operational link speed

use serde::{Deserialize, Serialize};
use std::fmt;

/// Possible interface link speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSpeed {
    /// Speed not negotiated or not reported
    #[default]
    Unknown,
    Mbps10,
    Mbps100,
    Gbps1,
    Gbps10,
    Gbps40,
    Gbps100,
}

impl LinkSpeed {
    /// Map a speed in megabits per second onto the enumeration
    ///
    /// Values outside the enumeration (e.g. 25G, or -1 reported by a
    /// link that is down) map to `Unknown`.
    pub fn from_mbps(mbps: i64) -> Self {
        match mbps {
            10 => Self::Mbps10,
            100 => Self::Mbps100,
            1_000 => Self::Gbps1,
            10_000 => Self::Gbps10,
            40_000 => Self::Gbps40,
            100_000 => Self::Gbps100,
            _ => Self::Unknown,
        }
    }

    /// Speed in megabits per second, `None` when unknown
    pub fn as_mbps(&self) -> Option<u64> {
        match self {
            Self::Unknown => None,
            Self::Mbps10 => Some(10),
            Self::Mbps100 => Some(100),
            Self::Gbps1 => Some(1_000),
            Self::Gbps10 => Some(10_000),
            Self::Gbps40 => Some(40_000),
            Self::Gbps100 => Some(100_000),
        }
    }
}

impl fmt::Display for LinkSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Mbps10 => "10M",
            Self::Mbps100 => "100M",
            Self::Gbps1 => "1G",
            Self::Gbps10 => "10G",
            Self::Gbps40 => "40G",
            Self::Gbps100 => "100G",
        };
        f.write_str(s)
    }
}
