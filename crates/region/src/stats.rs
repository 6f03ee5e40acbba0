//! Statistics for pools
//!
//! Counters live in `Cell`s because a pool has exactly one owner; a
//! [`PoolStats`] snapshot combines them with the current chain and list
//! state.

use core::cell::Cell;
use core::fmt;

use crate::utils::format_bytes;

/// Running counters kept by a pool
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub(crate) small_allocations: Cell<u64>,
    pub(crate) large_allocations: Cell<u64>,
    pub(crate) large_slot_reuses: Cell<u64>,
    pub(crate) block_growths: Cell<u64>,
    pub(crate) resets: Cell<u64>,
}

impl PoolCounters {
    #[inline]
    pub(crate) fn bump(counter: &Cell<u64>) {
        counter.set(counter.get() + 1);
    }
}

/// Point-in-time view of a pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolStats {
    /// Blocks in the chain
    pub blocks: usize,
    /// Size of each block
    pub block_size: usize,
    /// Total bytes reserved by the chain
    pub capacity: usize,
    /// Bytes handed out from the chain, padding included
    pub used: usize,
    /// Large slots in the list, free ones included
    pub large_slots: usize,
    /// Large slots currently holding a payload
    pub large_live: usize,
    /// Bytes held by live large payloads
    pub large_bytes: usize,
    /// Registered cleanup handlers
    pub cleanups: usize,
    /// Requests served by the bump allocator
    pub small_allocations: u64,
    /// Requests served by the large allocator
    pub large_allocations: u64,
    /// Large requests that reused a free slot
    pub large_slot_reuses: u64,
    /// Blocks appended after creation
    pub block_growths: u64,
    /// Resets performed
    pub resets: u64,
}

impl PoolStats {
    /// Bytes still free across the chain
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.used)
    }

    /// Calculates chain utilization ratio (0..1)
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.used as f64 / self.capacity as f64
        }
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "blocks:        {} x {}",
            self.blocks,
            format_bytes(self.block_size)
        )?;
        writeln!(
            f,
            "chain:         {} used of {} ({:.1}%)",
            format_bytes(self.used),
            format_bytes(self.capacity),
            self.utilization() * 100.0
        )?;
        writeln!(
            f,
            "large:         {} live / {} slots ({})",
            self.large_live,
            self.large_slots,
            format_bytes(self.large_bytes)
        )?;
        writeln!(f, "cleanups:      {}", self.cleanups)?;
        writeln!(
            f,
            "allocations:   {} small, {} large ({} slot reuses)",
            self.small_allocations, self.large_allocations, self.large_slot_reuses
        )?;
        write!(
            f,
            "growths:       {}, resets: {}",
            self.block_growths, self.resets
        )
    }
}
