//! Pool configuration

use core::alloc::Layout;

use crate::error::{MemoryError, MemoryResult};
use crate::utils::BLOCK_ALIGNMENT;

/// Default block size: one page
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Largest request served by the bump allocator unless configured otherwise
pub const DEFAULT_MAX_SMALL_SIZE: usize = 4095;

/// Failed walks a block tolerates before the current hint skips it
pub const DEFAULT_FAIL_THRESHOLD: usize = 4;

/// Number of most recent large slots examined for reuse
pub const DEFAULT_LARGE_REUSE_LOOKAHEAD: usize = 4;

/// Configuration for [`Pool`](crate::Pool)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PoolConfig {
    /// Size in bytes of every block in the chain
    pub block_size: usize,

    /// Upper bound for small requests; the effective threshold is
    /// `min(block_size, max_small_size)`
    pub max_small_size: usize,

    /// A block whose fail count already exceeds this value is skipped
    /// by the current hint
    pub fail_threshold: usize,

    /// How many of the most recent large slots are checked for reuse
    pub large_reuse_lookahead: usize,

    /// Fill pattern for freshly allocated blocks
    pub alloc_pattern: Option<u8>,

    /// Fill pattern written over rewound memory on reset
    pub reset_pattern: Option<u8>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_small_size: DEFAULT_MAX_SMALL_SIZE,
            fail_threshold: DEFAULT_FAIL_THRESHOLD,
            large_reuse_lookahead: DEFAULT_LARGE_REUSE_LOOKAHEAD,
            alloc_pattern: None,
            reset_pattern: None,
        }
    }
}

impl PoolConfig {
    /// Creates config with the given block size and default limits
    pub fn new(block_size: usize) -> Self {
        Self::default().with_block_size(block_size)
    }

    /// Production configuration - 16KB blocks, no fill patterns
    pub fn production() -> Self {
        Self {
            block_size: 16 * 1024,
            ..Self::default()
        }
    }

    /// Debug configuration - small blocks and fill patterns that make
    /// stale reads visible
    pub fn debug() -> Self {
        Self {
            block_size: 1024,
            alloc_pattern: Some(0xAA),
            reset_pattern: Some(0xDD),
            ..Self::default()
        }
    }

    /// Small objects configuration - for per-request scratch data
    pub fn small_objects() -> Self {
        Self {
            block_size: 2048,
            max_small_size: 512,
            ..Self::default()
        }
    }

    /// Sets block size
    #[must_use = "builder methods must be chained or built"]
    pub fn with_block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Sets the small-request cap
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_small_size(mut self, size: usize) -> Self {
        self.max_small_size = size;
        self
    }

    /// Sets the fail threshold for the current hint
    #[must_use = "builder methods must be chained or built"]
    pub fn with_fail_threshold(mut self, threshold: usize) -> Self {
        self.fail_threshold = threshold;
        self
    }

    /// Sets the large-slot reuse lookahead
    #[must_use = "builder methods must be chained or built"]
    pub fn with_large_reuse_lookahead(mut self, lookahead: usize) -> Self {
        self.large_reuse_lookahead = lookahead;
        self
    }

    /// Sets the fill pattern for new blocks
    #[must_use = "builder methods must be chained or built"]
    pub fn with_alloc_pattern(mut self, pattern: Option<u8>) -> Self {
        self.alloc_pattern = pattern;
        self
    }

    /// Sets the fill pattern for rewound memory
    #[must_use = "builder methods must be chained or built"]
    pub fn with_reset_pattern(mut self, pattern: Option<u8>) -> Self {
        self.reset_pattern = pattern;
        self
    }

    /// Effective small-request threshold for this configuration
    #[inline]
    pub fn effective_max_small_size(&self) -> usize {
        self.block_size.min(self.max_small_size)
    }

    /// Layout of one chain block
    pub fn block_layout(&self) -> MemoryResult<Layout> {
        Layout::from_size_align(self.block_size, BLOCK_ALIGNMENT).map_err(|_| {
            MemoryError::invalid_config("block size does not form a valid layout")
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> MemoryResult<()> {
        if self.block_size == 0 {
            return Err(MemoryError::invalid_config(
                "Block size must be greater than 0",
            ));
        }

        if self.max_small_size == 0 {
            return Err(MemoryError::invalid_config(
                "Max small size must be greater than 0",
            ));
        }

        self.block_layout()?;

        Ok(())
    }
}
