//! Region pool: a chain of bump-allocated blocks with a tracked list of
//! large allocations and a cleanup registry
//!
//! # Safety
//!
//! This module implements a single-threaded region allocator:
//! - `RefCell` for the chain and the slot lists (short, non-reentrant borrows)
//! - `Cell` for cursors, fail counts and the current hint
//! - Blocks and large payloads come from the pool's [`RawAllocator`]
//! - Pointers handed out stay valid until [`Pool::reset`] or drop, both of
//!   which need exclusive access; large payloads additionally end at
//!   [`Pool::free_large`]
//!
//! ## Invariants
//!
//! - Every block cursor stays within `[0, block_size]`
//! - The chain is never empty; index 0 is the head block
//! - `current` always indexes an existing block
//! - A large slot is either free or owns exactly one live payload
//!
//! ## Not Thread-Safe
//!
//! - Uses `Cell`/`RefCell` instead of atomics
//! - `Pool` is neither `Send` nor `Sync`; one owner per pool

mod chain;
mod cleanup;
mod large;
mod small;
mod typed;

use core::alloc::Layout;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ptr::NonNull;

#[cfg(feature = "logging")]
use tracing::debug;

pub use self::chain::BlockInfo;
use self::chain::ChainNode;
use self::cleanup::CleanupEntry;
use self::large::LargeSlot;
use crate::allocator::{RawAllocator, SystemAllocator};
use crate::config::PoolConfig;
use crate::error::{MemoryError, MemoryResult};
use crate::stats::{PoolCounters, PoolStats};
use crate::utils::{BLOCK_ALIGNMENT, POOL_ALIGNMENT};

/// Region-based pool allocator
///
/// Small requests are bump-allocated from a chain of equally sized blocks,
/// requests above [`max_small_size`](Self::max_small_size) get their own
/// payload from the raw allocator. Nothing is freed individually except
/// large payloads; [`reset`](Self::reset) and drop reclaim everything at
/// once.
///
/// # Example
///
/// ```
/// use nebula_region::Pool;
///
/// let pool = Pool::new(1024)?;
/// let header = pool.alloc(64)?;
/// let name = pool.alloc_str("request-42")?;
/// pool.register_cleanup(String::from("conn"), drop)?;
///
/// assert_eq!(name, "request-42");
/// assert!(pool.contains(header.as_ptr()));
/// # Ok::<(), nebula_region::MemoryError>(())
/// ```
pub struct Pool<A: RawAllocator = SystemAllocator> {
    chain: RefCell<Vec<ChainNode>>,
    current: Cell<usize>,
    block_layout: Layout,
    max_small_size: usize,
    large: RefCell<Vec<LargeSlot>>,
    cleanups: RefCell<Vec<CleanupEntry>>,
    config: PoolConfig,
    counters: PoolCounters,
    allocator: A,
}

impl Pool<SystemAllocator> {
    /// Creates a pool whose blocks are `size` bytes each
    pub fn new(size: usize) -> MemoryResult<Self> {
        Self::with_config(PoolConfig::new(size))
    }

    /// Creates a pool from a configuration
    pub fn with_config(config: PoolConfig) -> MemoryResult<Self> {
        Self::with_allocator(config, SystemAllocator::new())
    }
}

impl<A: RawAllocator> Pool<A> {
    /// Creates a pool that draws all memory from `allocator`
    ///
    /// Allocates the head block immediately; fails with
    /// [`MemoryError::OutOfMemory`](crate::MemoryError::OutOfMemory) if that is impossible.
    pub fn with_allocator(config: PoolConfig, allocator: A) -> MemoryResult<Self> {
        config.validate()?;
        let block_layout = config.block_layout()?;

        let head = ChainNode::allocate(&allocator, block_layout, config.alloc_pattern)?;

        #[cfg(feature = "logging")]
        debug!(
            block_size = block_layout.size(),
            max_small_size = config.effective_max_small_size(),
            "pool created"
        );

        Ok(Self {
            chain: RefCell::new(vec![head]),
            current: Cell::new(0),
            block_layout,
            max_small_size: config.effective_max_small_size(),
            large: RefCell::new(Vec::new()),
            cleanups: RefCell::new(Vec::new()),
            config,
            counters: PoolCounters::default(),
            allocator,
        })
    }

    /// Allocates `size` bytes aligned to a machine word
    #[must_use = "allocated memory must be used"]
    pub fn alloc(&self, size: usize) -> MemoryResult<NonNull<u8>> {
        self.dispatch(size, POOL_ALIGNMENT)
    }

    /// Allocates `size` bytes with no alignment guarantee
    ///
    /// Packs byte strings tighter than [`alloc`](Self::alloc).
    #[must_use = "allocated memory must be used"]
    pub fn alloc_unaligned(&self, size: usize) -> MemoryResult<NonNull<u8>> {
        self.dispatch(size, 1)
    }

    /// Allocates `size` word-aligned bytes and zero-fills them
    #[must_use = "allocated memory must be used"]
    pub fn alloc_zeroed(&self, size: usize) -> MemoryResult<NonNull<u8>> {
        let ptr = self.alloc(size)?;
        // SAFETY: ptr was just allocated with room for size bytes and is not
        // yet visible to the caller.
        unsafe { ptr.as_ptr().write_bytes(0, size) };
        Ok(ptr)
    }

    /// Routes a request to the small or large allocator
    ///
    /// `align` must be a power of two.
    pub(crate) fn dispatch(&self, size: usize, align: usize) -> MemoryResult<NonNull<u8>> {
        debug_assert!(align.is_power_of_two());

        if size <= self.max_small_size && align <= BLOCK_ALIGNMENT {
            self.alloc_small(size, align)
        } else {
            // large payloads are at least word aligned, like the system allocator
            let layout = Layout::from_size_align(size.max(1), align.max(POOL_ALIGNMENT))?;
            self.alloc_large(layout)
        }
    }

    /// Releases every large payload and rewinds every block
    ///
    /// Blocks stay in the chain for reuse and cleanup handlers stay
    /// registered; they only run on drop.
    pub fn reset(&mut self) {
        let released = self.release_large_payloads();
        self.large.get_mut().clear();

        for node in self.chain.get_mut().iter() {
            node.rewind(self.config.reset_pattern);
        }
        self.current.set(0);
        PoolCounters::bump(&self.counters.resets);

        #[cfg(feature = "logging")]
        debug!(
            blocks = self.chain.get_mut().len(),
            large_released = released,
            "pool reset"
        );
        #[cfg(not(feature = "logging"))]
        let _ = released;
    }

    /// Destroys the pool
    ///
    /// Runs every cleanup handler (most recently registered first), then
    /// releases large payloads, then the chain blocks. Equivalent to
    /// dropping the pool.
    pub fn destroy(self) {
        drop(self);
    }

    fn release_large_payloads(&mut self) -> usize {
        let mut released = 0;
        for slot in self.large.get_mut().iter_mut() {
            if let Some((ptr, layout)) = slot.take() {
                // SAFETY: occupied slots own payloads from self.allocator with
                // the recorded layout; take() clears the slot so it is freed once.
                unsafe { self.allocator.raw_free(ptr, layout) };
                released += 1;
            }
        }
        released
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Largest request served by the bump allocator
    #[inline]
    pub fn max_small_size(&self) -> usize {
        self.max_small_size
    }

    /// Size of every block in the chain
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_layout.size()
    }

    /// Number of blocks in the chain
    pub fn chain_len(&self) -> usize {
        self.chain.borrow().len()
    }

    /// Index of the first block small allocations are tried against
    #[inline]
    pub fn current_block(&self) -> usize {
        self.current.get()
    }

    /// Snapshot of every block, head first
    pub fn blocks(&self) -> Vec<BlockInfo> {
        self.chain.borrow().iter().map(ChainNode::info).collect()
    }

    /// Whether `ptr` points into one of the chain blocks
    pub fn contains(&self, ptr: *const u8) -> bool {
        let addr = ptr as usize;
        self.chain.borrow().iter().any(|node| node.contains(addr))
    }

    /// Configuration the pool was built from
    #[inline]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// The raw allocator backing this pool
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Point-in-time statistics
    pub fn stats(&self) -> PoolStats {
        let chain = self.chain.borrow();
        let large = self.large.borrow();

        PoolStats {
            blocks: chain.len(),
            block_size: self.block_layout.size(),
            capacity: chain.iter().map(ChainNode::capacity).sum(),
            used: chain.iter().map(ChainNode::used).sum(),
            large_slots: large.len(),
            large_live: large.iter().filter(|slot| slot.is_occupied()).count(),
            large_bytes: large.iter().map(LargeSlot::payload_size).sum(),
            cleanups: self.cleanups.borrow().len(),
            small_allocations: self.counters.small_allocations.get(),
            large_allocations: self.counters.large_allocations.get(),
            large_slot_reuses: self.counters.large_slot_reuses.get(),
            block_growths: self.counters.block_growths.get(),
            resets: self.counters.resets.get(),
        }
    }
}

impl<A: RawAllocator> Drop for Pool<A> {
    fn drop(&mut self) {
        let cleanups = self.run_cleanups();
        let released = self.release_large_payloads();

        let chain = core::mem::take(self.chain.get_mut());
        let blocks = chain.len();
        for node in chain {
            // SAFETY: every node was allocated from self.allocator.
            unsafe { node.release(&self.allocator) };
        }

        #[cfg(feature = "logging")]
        debug!(cleanups, large_released = released, blocks, "pool destroyed");
        #[cfg(not(feature = "logging"))]
        let _ = (cleanups, released, blocks);
    }
}

impl<A: RawAllocator> fmt::Debug for Pool<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("block_size", &self.block_layout.size())
            .field("max_small_size", &self.max_small_size)
            .field("blocks", &self.chain_len())
            .field("current", &self.current.get())
            .field("large_slots", &self.large_slots())
            .field("cleanups", &self.cleanup_count())
            .finish()
    }
}

/// Makes room for `additional` more entries in a bookkeeping list
///
/// Bookkeeping lists live on the global heap, not in the pool's allocator,
/// so a failure here surfaces as `OutOfMemory` for the entries themselves.
pub(super) fn reserve_bookkeeping<T>(list: &mut Vec<T>, additional: usize) -> MemoryResult<()> {
    list.try_reserve(additional).map_err(|_| {
        MemoryError::out_of_memory(
            core::mem::size_of::<T>().saturating_mul(additional),
            core::mem::align_of::<T>(),
        )
    })
}
