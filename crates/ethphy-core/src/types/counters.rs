//! Counter snapshots
//!
//! Both snapshot types are plain values read from the platform at the
//! instant of the query. Nothing here is cached or diffed; callers that
//! compute rates do so from two snapshots and their `sampled_at` stamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ethernet-like MIB statistics of one physical interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthPhyIntfCounters {
    pub single_collision_frames: u64,
    pub multiple_collision_frames: u64,
    pub fcs_errors: u64,
    pub alignment_errors: u64,
    pub deferred_transmissions: u64,
    pub late_collisions: u64,
    pub excessive_collisions: u64,
    pub internal_mac_transmit_errors: u64,
    pub carrier_sense_errors: u64,
    pub internal_mac_receive_errors: u64,
    pub frame_too_shorts: u64,
    pub frame_too_longs: u64,
    pub sqe_test_errors: u64,
    pub symbol_errors: u64,
    pub in_unknown_opcodes: u64,
    pub out_pause_frames: u64,
    pub in_pause_frames: u64,
    pub fragments: u64,
    pub jabbers: u64,
    /// When the platform produced this snapshot
    pub sampled_at: DateTime<Utc>,
}

impl EthPhyIntfCounters {
    /// A snapshot with every counter at zero, stamped now
    pub fn zeroed() -> Self {
        Self {
            single_collision_frames: 0,
            multiple_collision_frames: 0,
            fcs_errors: 0,
            alignment_errors: 0,
            deferred_transmissions: 0,
            late_collisions: 0,
            excessive_collisions: 0,
            internal_mac_transmit_errors: 0,
            carrier_sense_errors: 0,
            internal_mac_receive_errors: 0,
            frame_too_shorts: 0,
            frame_too_longs: 0,
            sqe_test_errors: 0,
            symbol_errors: 0,
            in_unknown_opcodes: 0,
            out_pause_frames: 0,
            in_pause_frames: 0,
            fragments: 0,
            jabbers: 0,
            sampled_at: Utc::now(),
        }
    }

    /// Sum of all collision counters
    pub fn total_collisions(&self) -> u64 {
        self.single_collision_frames
            + self.multiple_collision_frames
            + self.late_collisions
            + self.excessive_collisions
    }
}

/// Frame counts bucketed by frame size in octets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSizeBins {
    pub frames_64_octet: u64,
    pub frames_65_to_127_octet: u64,
    pub frames_128_to_255_octet: u64,
    pub frames_256_to_511_octet: u64,
    pub frames_512_to_1023_octet: u64,
    pub frames_1024_to_1522_octet: u64,
    pub frames_1523_to_max_octet: u64,
}

impl FrameSizeBins {
    /// Total frames across all buckets
    pub fn total(&self) -> u64 {
        self.frames_64_octet
            + self.frames_65_to_127_octet
            + self.frames_128_to_255_octet
            + self.frames_256_to_511_octet
            + self.frames_512_to_1023_octet
            + self.frames_1024_to_1522_octet
            + self.frames_1523_to_max_octet
    }
}

/// Histogram ("bin") counters of one physical interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthPhyIntfBinCounters {
    /// Received frames by size
    pub input: FrameSizeBins,
    /// Transmitted frames by size
    pub output: FrameSizeBins,
    /// When the platform produced this snapshot
    pub sampled_at: DateTime<Utc>,
}

impl EthPhyIntfBinCounters {
    /// A snapshot with empty histograms, stamped now
    pub fn zeroed() -> Self {
        Self {
            input: FrameSizeBins::default(),
            output: FrameSizeBins::default(),
            sampled_at: Utc::now(),
        }
    }

    /// Total received frames
    pub fn total_in_frames(&self) -> u64 {
        self.input.total()
    }

    /// Total transmitted frames
    pub fn total_out_frames(&self) -> u64 {
        self.output.total()
    }
}
