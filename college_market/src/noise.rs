//! Evaluation noise added to latent student quality, plus the logistic
//! distribution behind student taste shocks.

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::{MarketError, Result};

/// Logistic distribution, sampled by inverting its CDF.
///
/// `rand_distr` has no logistic distribution, so this fills the gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Logistic {
    location: f64,
    scale: f64,
}

impl Logistic {
    pub fn new(location: f64, scale: f64) -> Result<Self> {
        if !location.is_finite() || !scale.is_finite() || scale <= 0.0 {
            return Err(MarketError::InvalidConfiguration(format!(
                "logistic needs finite location and positive scale, got ({}, {})",
                location, scale
            )));
        }
        Ok(Logistic { location, scale })
    }

    /// Location 0, scale 1
    pub fn standard() -> Self {
        Logistic {
            location: 0.0,
            scale: 1.0,
        }
    }
}

impl Distribution<f64> for Logistic {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // Open interval keeps ln finite
        let mut u: f64 = rng.random();
        while u <= 0.0 {
            u = rng.random();
        }
        self.location + self.scale * (u / (1.0 - u)).ln()
    }
}

/// Noise a college adds to each student's latent quality
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseModel {
    /// Perfect evaluation
    None,
    Normal { std_dev: f64 },
    /// Uniform on [-half_width, half_width]
    Uniform { half_width: f64 },
    Logistic { scale: f64 },
}

impl NoiseModel {
    pub fn validate(&self) -> Result<()> {
        let (name, param) = match *self {
            NoiseModel::None => return Ok(()),
            NoiseModel::Normal { std_dev } => ("std_dev", std_dev),
            NoiseModel::Uniform { half_width } => ("half_width", half_width),
            NoiseModel::Logistic { scale } => ("scale", scale),
        };
        if !param.is_finite() || param < 0.0 {
            return Err(MarketError::InvalidConfiguration(format!(
                "noise {} must be finite and non-negative, got {}",
                name, param
            )));
        }
        Ok(())
    }

    /// Draw `len` independent noise terms
    pub fn sample_vec<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Result<Vec<f64>> {
        self.validate()?;
        let draws = match *self {
            NoiseModel::None => vec![0.0; len],
            // Zero spread degenerates to no noise
            NoiseModel::Normal { std_dev } if std_dev == 0.0 => vec![0.0; len],
            NoiseModel::Uniform { half_width } if half_width == 0.0 => vec![0.0; len],
            NoiseModel::Logistic { scale } if scale == 0.0 => vec![0.0; len],
            NoiseModel::Normal { std_dev } => {
                let dist = Normal::new(0.0, std_dev).map_err(invalid)?;
                dist.sample_iter(rng).take(len).collect()
            }
            NoiseModel::Uniform { half_width } => {
                let dist = Uniform::new_inclusive(-half_width, half_width).map_err(invalid)?;
                dist.sample_iter(rng).take(len).collect()
            }
            NoiseModel::Logistic { scale } => {
                let dist = Logistic::new(0.0, scale)?;
                dist.sample_iter(rng).take(len).collect()
            }
        };
        Ok(draws)
    }
}

impl Default for NoiseModel {
    fn default() -> Self {
        NoiseModel::Normal { std_dev: 0.1 }
    }
}

fn invalid<E: std::fmt::Display>(err: E) -> MarketError {
    MarketError::InvalidConfiguration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn standard_logistic_is_centred() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws: Vec<f64> = Logistic::standard()
            .sample_iter(&mut rng)
            .take(20_000)
            .collect();

        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / draws.len() as f64;

        assert_abs_diff_eq!(mean, 0.0, epsilon = 0.05);
        // Variance of the standard logistic is pi^2 / 3
        assert_abs_diff_eq!(var, std::f64::consts::PI.powi(2) / 3.0, epsilon = 0.15);
    }

    #[test]
    fn logistic_rejects_bad_scale() {
        assert!(Logistic::new(0.0, 0.0).is_err());
        assert!(Logistic::new(0.0, f64::NAN).is_err());
        assert!(Logistic::new(1.0, 2.0).is_ok());
    }

    #[test]
    fn no_noise_is_all_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        let draws = NoiseModel::None.sample_vec(5, &mut rng).unwrap();
        assert_eq!(draws, vec![0.0; 5]);
    }

    #[test]
    fn uniform_noise_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let draws = NoiseModel::Uniform { half_width: 0.25 }
            .sample_vec(1000, &mut rng)
            .unwrap();
        assert!(draws.iter().all(|x| x.abs() <= 0.25));
    }

    #[test]
    fn negative_spread_is_invalid() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = NoiseModel::Normal { std_dev: -1.0 }
            .sample_vec(3, &mut rng)
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidConfiguration(_)));
    }

    #[test]
    fn same_seed_same_noise() {
        let model = NoiseModel::Logistic { scale: 0.5 };
        let a = model.sample_vec(10, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = model.sample_vec(10, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }
}
