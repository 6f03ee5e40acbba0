//! Property tests for allocation invariants.
//!
//! For arbitrary request sequences: small allocations are disjoint, inside a
//! chain block and aligned; large ones never touch the chain; reset always
//! brings the next allocation back to the head block start.

use nebula_region::utils::{POOL_ALIGNMENT, is_aligned};
use nebula_region::{Pool, PoolConfig};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Request {
    Aligned(usize),
    Unaligned(usize),
}

fn request() -> impl Strategy<Value = Request> {
    prop_oneof![
        (0_usize..600).prop_map(Request::Aligned),
        (0_usize..600).prop_map(Request::Unaligned),
    ]
}

// ---------------------------------------------------------------------------
// Property: small allocations are disjoint, in bounds and aligned
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn small_allocations_are_disjoint_and_aligned(
        block_size in 64_usize..1024,
        requests in prop::collection::vec(request(), 1..120),
    ) {
        let pool = Pool::new(block_size).unwrap();
        let mut ranges: Vec<(usize, usize)> = Vec::new();

        for req in requests {
            let (size, ptr) = match req {
                Request::Aligned(size) => {
                    let ptr = pool.alloc(size).unwrap();
                    prop_assert!(is_aligned(ptr.as_ptr() as usize, POOL_ALIGNMENT));
                    (size, ptr)
                }
                Request::Unaligned(size) => (size, pool.alloc_unaligned(size).unwrap()),
            };

            let start = ptr.as_ptr() as usize;
            if size > pool.max_small_size() {
                prop_assert!(!pool.contains(ptr.as_ptr()));
                continue;
            }
            if size == 0 {
                continue;
            }

            let end = start + size;
            let inside = pool
                .blocks()
                .iter()
                .any(|block| start >= block.start && end <= block.end);
            prop_assert!(inside, "allocation {start:#x}..{end:#x} outside every block");

            for &(s, e) in &ranges {
                prop_assert!(end <= s || start >= e, "overlap with {s:#x}..{e:#x}");
            }
            ranges.push((start, end));
        }
    }

    #[test]
    fn cursors_stay_within_blocks(
        requests in prop::collection::vec(0_usize..300, 1..200),
    ) {
        let pool = Pool::with_config(PoolConfig::new(256).with_fail_threshold(1)).unwrap();
        for size in requests {
            let _ = pool.alloc(size).unwrap();
        }

        prop_assert!(pool.current_block() < pool.chain_len());
        for block in pool.blocks() {
            prop_assert!(block.start <= block.cursor && block.cursor <= block.end);
        }
    }

    #[test]
    fn reset_returns_to_head_start(
        requests in prop::collection::vec(request(), 0..80),
    ) {
        let mut pool = Pool::new(512).unwrap();
        for req in requests {
            match req {
                Request::Aligned(size) => { let _ = pool.alloc(size).unwrap(); }
                Request::Unaligned(size) => { let _ = pool.alloc_unaligned(size).unwrap(); }
            }
        }
        let blocks = pool.chain_len();

        pool.reset();

        prop_assert_eq!(pool.chain_len(), blocks);
        prop_assert_eq!(pool.large_slots(), 0);
        let ptr = pool.alloc(8).unwrap();
        prop_assert_eq!(ptr.as_ptr() as usize, pool.blocks()[0].start);
    }
}
