//! How many colleges each student gets to apply to, and which ones.

use std::fmt;
use std::str::FromStr;

use rand::seq::index;
use rand::Rng;

use crate::{MarketError, Result};

/// Distribution of application budgets across students
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessDistribution {
    /// Budget drawn uniformly from 1..=C for each student
    Uniform,
    /// Every student applies everywhere
    #[default]
    Total,
}

/// Which colleges a student with a limited budget applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationStrategy {
    /// Their k favourite colleges
    #[default]
    Top,
    /// k colleges chosen at random, kept in true order
    Random,
}

impl FromStr for AccessDistribution {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uniform" => Ok(AccessDistribution::Uniform),
            "total" => Ok(AccessDistribution::Total),
            other => Err(MarketError::InvalidConfiguration(format!(
                "invalid access distribution '{}'",
                other
            ))),
        }
    }
}

impl FromStr for ApplicationStrategy {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(ApplicationStrategy::Top),
            "random" => Ok(ApplicationStrategy::Random),
            other => Err(MarketError::InvalidConfiguration(format!(
                "invalid strategy '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for AccessDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessDistribution::Uniform => write!(f, "uniform"),
            AccessDistribution::Total => write!(f, "total"),
        }
    }
}

impl fmt::Display for ApplicationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationStrategy::Top => write!(f, "top"),
            ApplicationStrategy::Random => write!(f, "random"),
        }
    }
}

/// Application limits applied to true student preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessPolicy {
    pub distribution: AccessDistribution,
    /// Only consulted under `Uniform`
    pub strategy: ApplicationStrategy,
}

impl AccessPolicy {
    pub fn new(distribution: AccessDistribution, strategy: ApplicationStrategy) -> Self {
        AccessPolicy {
            distribution,
            strategy,
        }
    }

    /// Parse both settings from their string names.
    ///
    /// The strategy name is only read under `uniform`; with `total` access it
    /// is ignored and the default strategy is kept.
    pub fn from_names(distribution: &str, strategy: &str) -> Result<Self> {
        let distribution: AccessDistribution = distribution.parse()?;
        let strategy = match distribution {
            AccessDistribution::Uniform => strategy.parse()?,
            AccessDistribution::Total => ApplicationStrategy::default(),
        };
        Ok(AccessPolicy::new(distribution, strategy))
    }

    /// Cut each true list down to what the student actually submits.
    ///
    /// Returns the submitted lists and the number of applications per student.
    /// Budgets are bounded by each list's own length; an empty list submits
    /// nothing.
    pub fn limit<R: Rng + ?Sized>(
        &self,
        true_prefs: &[Vec<usize>],
        rng: &mut R,
    ) -> (Vec<Vec<usize>>, Vec<usize>) {
        match self.distribution {
            AccessDistribution::Total => (
                true_prefs.to_vec(),
                true_prefs.iter().map(Vec::len).collect(),
            ),
            AccessDistribution::Uniform => {
                let mut num_apps = Vec::with_capacity(true_prefs.len());
                let limited = true_prefs
                    .iter()
                    .map(|prefs| {
                        let len = prefs.len();
                        if len == 0 {
                            num_apps.push(0);
                            return Vec::new();
                        }
                        let k = rng.random_range(1..=len);
                        num_apps.push(k);
                        match self.strategy {
                            ApplicationStrategy::Top => prefs[..k].to_vec(),
                            ApplicationStrategy::Random => {
                                let mut picks = index::sample(rng, len, k).into_vec();
                                picks.sort_unstable();
                                picks.into_iter().map(|i| prefs[i]).collect()
                            }
                        }
                    })
                    .collect();
                (limited, num_apps)
            }
        }
    }
}
