//! Standalone error types for nebula-region
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.

use core::alloc::Layout;
use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{debug, error};

// ============================================================================
// Main Error Type
// ============================================================================

/// Pool allocation errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// The raw allocator could not satisfy a request
    #[error("Out of memory: {size} bytes with {align} byte alignment")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
        /// Requested alignment
        align: usize,
    },

    /// `free_large` was given a pointer the pool does not track
    #[error("Large allocation not found at {address:#x}")]
    NotFound {
        /// Address passed by the caller
        address: usize,
    },

    /// Pool configuration rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration
        reason: String,
    },

    /// Size and alignment do not form a valid layout
    #[error("Invalid memory layout: {reason}")]
    InvalidLayout {
        /// Why the layout was rejected
        reason: String,
    },

    /// Alignment is not a power of two
    #[error("Invalid alignment: {alignment}")]
    InvalidAlignment {
        /// The rejected alignment
        alignment: usize,
    },
}

impl MemoryError {
    /// Check if error is retryable
    ///
    /// Running out of memory may succeed after a reset or once other
    /// pools release memory; everything else is a caller error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfMemory { .. } => "MEM:ALLOC:OOM",
            Self::NotFound { .. } => "MEM:LARGE:NOT_FOUND",
            Self::InvalidConfig { .. } => "MEM:CONFIG:INVALID",
            Self::InvalidLayout { .. } => "MEM:ALLOC:LAYOUT",
            Self::InvalidAlignment { .. } => "MEM:ALLOC:ALIGN",
        }
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create out of memory error
    pub fn out_of_memory(size: usize, align: usize) -> Self {
        #[cfg(feature = "logging")]
        error!(size, align, "raw allocation failed");

        Self::OutOfMemory { size, align }
    }

    /// Create out of memory error from layout
    pub fn out_of_memory_with_layout(layout: Layout) -> Self {
        Self::out_of_memory(layout.size(), layout.align())
    }

    /// Create not found error for an untracked large pointer
    pub fn not_found(address: usize) -> Self {
        #[cfg(feature = "logging")]
        debug!(address, "large allocation not tracked");

        Self::NotFound { address }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: &str) -> Self {
        Self::InvalidConfig {
            reason: reason.to_string(),
        }
    }

    /// Create invalid layout error
    pub fn invalid_layout(reason: &str) -> Self {
        Self::InvalidLayout {
            reason: reason.to_string(),
        }
    }

    /// Create invalid alignment error
    pub fn invalid_alignment(alignment: usize) -> Self {
        Self::InvalidAlignment { alignment }
    }

    /// Check if this is an out of memory error
    #[must_use]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }

    /// Check if this is a not found error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<core::alloc::LayoutError> for MemoryError {
    fn from(err: core::alloc::LayoutError) -> Self {
        Self::invalid_layout(&err.to_string())
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for pool operations
pub type MemoryResult<T> = core::result::Result<T, MemoryError>;

/// Generic result type alias
pub type Result<T> = MemoryResult<T>;

// ============================================================================
// Tests
// ============================================================================
