//! Synthetic request workload

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Context;
use nebula_region::{Pool, PoolStats};
use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::config::CliConfig;

/// Outcome of a `run`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub rounds: usize,
    pub large_released_early: usize,
    pub cleanups_run: usize,
    /// Pool state right before it was destroyed
    pub stats: PoolStats,
}

/// Runs every round against one pool, resetting between rounds
///
/// Each round allocates the small and large objects, releases every other
/// large payload early and registers the cleanup handlers.
pub fn run(config: &CliConfig) -> anyhow::Result<RunReport> {
    let workload = &config.workload;
    let mut pool = Pool::with_config(config.pool.clone()).context("failed to create pool")?;
    let cleanups_run = Rc::new(Cell::new(0_usize));
    let mut large_released_early = 0;

    for round in 0..workload.rounds {
        let _span = info_span!("round", round).entered();

        for _ in 0..workload.small {
            let _ = pool.alloc_zeroed(workload.small_size)?;
        }

        let large: Vec<_> = (0..workload.large)
            .map(|_| pool.alloc(workload.large_size))
            .collect::<Result<_, _>>()?;

        if workload.large_size > pool.max_small_size() {
            for ptr in large.iter().step_by(2) {
                // SAFETY: the payload is never touched again.
                unsafe { pool.free_large(*ptr)? };
                large_released_early += 1;
            }
        }

        for _ in 0..workload.cleanups {
            let counter = Rc::clone(&cleanups_run);
            pool.register_cleanup(round, move |_round| counter.set(counter.get() + 1))?;
        }

        debug!(stats = ?pool.stats(), "round finished");

        if round + 1 < workload.rounds {
            pool.reset();
        }
    }

    let stats = pool.stats();
    pool.destroy();

    info!(
        rounds = workload.rounds,
        cleanups = cleanups_run.get(),
        "workload finished"
    );

    Ok(RunReport {
        rounds: workload.rounds,
        large_released_early,
        cleanups_run: cleanups_run.get(),
        stats,
    })
}
