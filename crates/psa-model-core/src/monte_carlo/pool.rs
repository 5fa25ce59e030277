use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info_span};

use crate::error::PsaModelError;
use crate::monte_carlo::driver::{simulate, TrialOutcome};
use crate::monte_carlo::factors::TrialFactors;
use crate::scenario::ScenarioInputs;
use crate::PsaModelResult;

/// Fixed-size pool of worker threads that runs trials in batches.
pub struct WorkerPool {
    pool: ThreadPool,
    batch_size: usize,
}

impl WorkerPool {
    /// `workers = None` sizes the pool to the available cores.
    pub fn new(workers: Option<usize>, batch_size: usize) -> PsaModelResult<Self> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("psa-mc-{i}"));
        if let Some(n) = workers {
            if n == 0 {
                return Err(PsaModelError::WorkerPool(
                    "A worker pool needs at least one thread".into(),
                ));
            }
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| PsaModelError::WorkerPool(e.to_string()))?;

        Ok(Self {
            pool,
            batch_size: batch_size.max(1),
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Apply `processor` to consecutive batches of `items` on the pool.
    /// Results come back in batch order.
    pub fn map_batches<T, R, F>(&self, items: &[T], processor: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&[T]) -> R + Sync + Send,
    {
        self.pool
            .install(|| items.par_chunks(self.batch_size).map(processor).collect())
    }
}

/// [`simulate`] spread across a worker pool.
///
/// Outcomes are returned in the order of `trials`, and each outcome carries
/// its trial id, so the result is identical to the sequential run.
pub fn simulate_parallel(
    base: &ScenarioInputs,
    trials: &[TrialFactors],
    pool: &WorkerPool,
) -> PsaModelResult<Vec<TrialOutcome>> {
    let _span = info_span!(
        "simulate_parallel",
        trials = trials.len(),
        workers = pool.workers(),
        batch_size = pool.batch_size()
    )
    .entered();

    let batches = pool.map_batches(trials, |batch| {
        debug!(
            first_trial = ?batch.first().map(|t| t.trial_id),
            size = batch.len(),
            "running batch"
        );
        simulate(base, batch)
    });

    let mut outcomes = Vec::with_capacity(trials.len());
    for batch in batches {
        outcomes.extend(batch?);
    }
    Ok(outcomes)
}
