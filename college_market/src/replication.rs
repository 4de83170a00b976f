//! Parallel Monte Carlo replication of independent markets.
//!
//! Run `i` always draws from `StdRng::seed_from_u64(base_seed + i)` and
//! results come back in run order, so a batch is reproducible regardless of
//! thread count or scheduling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::analysis::{AggregateResults, MarketSummary};
use crate::config::{Culture, MarketConfig};
use crate::Result;

/// Runs one market configuration many times in parallel
pub struct ReplicationRunner {
    config: MarketConfig,
    num_runs: usize,
    base_seed: u64,
    num_threads: Option<usize>,
    progress_callback: Option<Arc<dyn Fn(usize, usize) + Send + Sync>>,
}

impl ReplicationRunner {
    pub fn new(config: MarketConfig, num_runs: usize, base_seed: u64) -> Self {
        ReplicationRunner {
            config,
            num_runs,
            base_seed,
            num_threads: None,
            progress_callback: None,
        }
    }

    /// Use a dedicated pool of `n` threads instead of rayon's global pool
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Called with `(completed, total)` after each run
    pub fn progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Summaries in run order; a failed run does not stop the others
    pub fn run(&self) -> Vec<Result<MarketSummary>> {
        let completed = AtomicUsize::new(0);

        let execute = || {
            (0..self.num_runs)
                .into_par_iter()
                .map(|run| {
                    let seed = self.base_seed.wrapping_add(run as u64);
                    let mut rng = StdRng::seed_from_u64(seed);
                    let result = self
                        .config
                        .build_market(&mut rng)
                        .map(|market| MarketSummary::from_market(&market));

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(done, self.num_runs);
                    }
                    result
                })
                .collect()
        };

        let pool = self.num_threads.and_then(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| warn!("falling back to global thread pool: {}", e))
                .ok()
        });

        debug!(
            "running {} markets ({} students, {} colleges, {} seats) from seed {}",
            self.num_runs,
            self.config.num_students,
            self.config.num_colleges,
            self.config.total_capacity(),
            self.base_seed
        );
        match pool {
            Some(pool) => pool.install(execute),
            None => execute(),
        }
    }

    /// Aggregate of all successful runs, or the first error
    pub fn aggregate(&self) -> Result<AggregateResults> {
        let summaries = self.run().into_iter().collect::<Result<Vec<_>>>()?;
        Ok(AggregateResults::from_summaries(&summaries))
    }
}

/// Run `num_runs` seeded replications of `config`
pub fn run_replications(
    config: &MarketConfig,
    num_runs: usize,
    base_seed: u64,
) -> Vec<Result<MarketSummary>> {
    ReplicationRunner::new(config.clone(), num_runs, base_seed).run()
}

/// Monoculture and polyculture results on identical seeds
#[derive(Debug, Clone, PartialEq)]
pub struct CultureComparison {
    pub monoculture: AggregateResults,
    pub polyculture: AggregateResults,
}

impl CultureComparison {
    pub fn print_summary(&self) {
        self.monoculture.print_summary(&Culture::Monoculture.to_string());
        self.polyculture.print_summary(&Culture::Polyculture.to_string());
    }
}

/// Run `config` under both cultures with the same seeds.
///
/// Student-side draws come first in every generator, so paired runs see the
/// same students and differ only in how colleges evaluate them.
pub fn compare_cultures(
    config: &MarketConfig,
    num_runs: usize,
    base_seed: u64,
) -> Result<CultureComparison> {
    let under = |culture: Culture| {
        let config = MarketConfig {
            generator: config.generator.with_culture(culture),
            ..config.clone()
        };
        ReplicationRunner::new(config, num_runs, base_seed).aggregate()
    };
    Ok(CultureComparison {
        monoculture: under(Culture::Monoculture)?,
        polyculture: under(Culture::Polyculture)?,
    })
}
