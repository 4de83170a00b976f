//! Simulated college admissions under deferred acceptance.
//!
//! Students and colleges are matched on *approximate* preferences (students
//! with limited applications, colleges with noisy evaluations) and the
//! outcome is scored against *true* preferences.

pub mod access;
pub mod analysis;
pub mod config;
pub mod error;
pub mod generators;
pub mod market;
pub mod noise;
pub mod replication;
pub mod students;

pub use access::{AccessDistribution, AccessPolicy, ApplicationStrategy};
pub use analysis::{AggregateResults, MarketSummary, MeanStd};
pub use config::{Culture, GeneratorConfig, MarketConfig};
pub use error::{MarketError, Result};
pub use generators::{
    FixedPreferences, MonocultureGenerator, PolycultureGenerator, PreferenceBundle,
    PreferenceGenerator,
};
pub use market::Market;
pub use noise::{Logistic, NoiseModel};
pub use replication::{compare_cultures, run_replications, CultureComparison, ReplicationRunner};
pub use students::StudentParams;
