//! Region-based memory pools for Nebula
//!
//! A [`Pool`] hands out many short-lived allocations that all share one
//! lifetime, typically a request or a task, and reclaims them together:
//!
//! - Small requests are bump-allocated from a chain of fixed-size blocks
//! - Large requests get their own payload and can be freed early
//! - Cleanup handlers run once when the pool is destroyed
//! - [`Pool::reset`] rewinds everything for reuse without returning blocks
//!
//! # Features
//!
//! - `logging` (default): Structured events through `tracing`
//! - `serde`: Serialize/Deserialize for [`PoolConfig`] and [`PoolStats`]
//!
//! # Example
//!
//! ```
//! use nebula_region::{Pool, PoolConfig};
//!
//! fn handle_request(pool: &mut Pool, body: &[u8]) -> nebula_region::Result<usize> {
//!     let copy = pool.alloc_slice_copy(body)?;
//!     let route = pool.alloc_str("/v1/workflows")?;
//!     let scratch = pool.alloc_zeroed(256)?;
//!
//!     let total = copy.len() + route.len();
//!     assert!(pool.contains(scratch.as_ptr()));
//!     Ok(total)
//! }
//!
//! let mut pool = Pool::with_config(PoolConfig::production())?;
//! for _ in 0..3 {
//!     handle_request(&mut pool, b"{\"id\":1}")?;
//!     pool.reset();
//! }
//! assert_eq!(pool.stats().resets, 3);
//! # Ok::<(), nebula_region::MemoryError>(())
//! ```
//!
//! # Thread Safety
//!
//! Pools are single-owner: they use `Cell`/`RefCell` internally and are
//! neither `Send` nor `Sync`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Raw block management is the point of this crate.
#![allow(unsafe_code)]

pub mod allocator;
pub mod config;
pub mod error;
pub mod pool;
pub mod stats;
pub mod utils;

pub use allocator::{RawAllocator, SystemAllocator};
pub use config::PoolConfig;
pub use error::{MemoryError, MemoryResult, Result};
pub use pool::{BlockInfo, Pool};
pub use stats::PoolStats;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types
pub mod prelude {
    pub use crate::allocator::{RawAllocator, SystemAllocator};
    pub use crate::config::PoolConfig;
    pub use crate::error::{MemoryError, MemoryResult};
    pub use crate::pool::{BlockInfo, Pool};
    pub use crate::stats::PoolStats;
}
