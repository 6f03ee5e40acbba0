//! Cleanup registry
//!
//! Handlers are kept outside the chain so they survive [`Pool::reset`];
//! they run once, newest first, when the pool is destroyed.

#[cfg(feature = "logging")]
use tracing::trace;

use super::{Pool, reserve_bookkeeping};
use crate::allocator::RawAllocator;
use crate::error::MemoryResult;

/// A handler that has captured its data argument
pub(crate) type CleanupEntry = Box<dyn FnOnce()>;

impl<A: RawAllocator> Pool<A> {
    /// Registers `handler` to be called with `data` when the pool is
    /// destroyed
    ///
    /// Handlers run in reverse registration order, before any large payload
    /// or block is released. There is no way to unregister.
    ///
    /// # Errors
    ///
    /// [`MemoryError::OutOfMemory`](crate::MemoryError::OutOfMemory) if the
    /// registry cannot grow.
    ///
    /// # Example
    ///
    /// ```
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    /// use nebula_region::Pool;
    ///
    /// let closed = Rc::new(RefCell::new(Vec::new()));
    /// let pool = Pool::new(1024)?;
    /// for fd in [3, 4] {
    ///     let closed = Rc::clone(&closed);
    ///     pool.register_cleanup(fd, move |fd| closed.borrow_mut().push(fd))?;
    /// }
    /// pool.destroy();
    ///
    /// assert_eq!(*closed.borrow(), [4, 3]);
    /// # Ok::<(), nebula_region::MemoryError>(())
    /// ```
    pub fn register_cleanup<T, F>(&self, data: T, handler: F) -> MemoryResult<()>
    where
        T: 'static,
        F: FnOnce(T) + 'static,
    {
        let mut cleanups = self.cleanups.borrow_mut();
        reserve_bookkeeping(&mut *cleanups, 1)?;

        cleanups.push(Box::new(move || handler(data)));

        #[cfg(feature = "logging")]
        trace!(registered = cleanups.len(), "cleanup registered");

        Ok(())
    }

    /// Number of registered cleanup handlers
    pub fn cleanup_count(&self) -> usize {
        self.cleanups.borrow().len()
    }

    /// Drains the registry, newest handler first
    ///
    /// Returns how many handlers ran.
    pub(super) fn run_cleanups(&mut self) -> usize {
        let handlers = core::mem::take(self.cleanups.get_mut());
        let count = handlers.len();
        for handler in handlers.into_iter().rev() {
            handler();
        }
        count
    }
}
