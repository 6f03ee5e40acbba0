//! Shared raw allocators for integration tests

#![allow(dead_code)]

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ptr::NonNull;
use std::rc::Rc;

use nebula_region::{RawAllocator, SystemAllocator};

/// Something that happened to a pool, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Alloc { addr: usize, size: usize },
    Free { addr: usize, size: usize },
    Cleanup(u32),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Forwards to the system allocator and records every call
#[derive(Debug, Clone)]
pub struct RecordingAllocator {
    pub log: Log,
    live: Rc<Cell<usize>>,
}

impl RecordingAllocator {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            live: Rc::new(Cell::new(0)),
        }
    }

    /// Blocks handed out and not yet returned
    pub fn live(&self) -> usize {
        self.live.get()
    }

    /// Handle to the live counter that outlives the pool
    pub fn live_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.live)
    }
}

unsafe impl RawAllocator for RecordingAllocator {
    fn raw_alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        let ptr = SystemAllocator.raw_alloc(layout)?;
        self.live.set(self.live.get() + 1);
        self.log.borrow_mut().push(Event::Alloc {
            addr: ptr.as_ptr() as usize,
            size: layout.size(),
        });
        Some(ptr)
    }

    unsafe fn raw_free(&self, ptr: NonNull<u8>, layout: Layout) {
        self.live.set(self.live.get() - 1);
        self.log.borrow_mut().push(Event::Free {
            addr: ptr.as_ptr() as usize,
            size: layout.size(),
        });
        unsafe { SystemAllocator.raw_free(ptr, layout) };
    }
}

/// Succeeds a fixed number of times, then refuses every request
#[derive(Debug)]
pub struct FailingAllocator {
    budget: Cell<usize>,
    live: Cell<usize>,
}

impl FailingAllocator {
    pub fn after(successes: usize) -> Self {
        Self {
            budget: Cell::new(successes),
            live: Cell::new(0),
        }
    }

    /// Allows `extra` more successful allocations
    pub fn refill(&self, extra: usize) {
        self.budget.set(self.budget.get() + extra);
    }

    pub fn live(&self) -> usize {
        self.live.get()
    }
}

unsafe impl RawAllocator for FailingAllocator {
    fn raw_alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        let budget = self.budget.get();
        if budget == 0 {
            return None;
        }
        let ptr = SystemAllocator.raw_alloc(layout)?;
        self.budget.set(budget - 1);
        self.live.set(self.live.get() + 1);
        Some(ptr)
    }

    unsafe fn raw_free(&self, ptr: NonNull<u8>, layout: Layout) {
        self.live.set(self.live.get() - 1);
        unsafe { SystemAllocator.raw_free(ptr, layout) };
    }
}
