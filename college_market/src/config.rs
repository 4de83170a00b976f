use std::fmt;
use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::access::AccessPolicy;
use crate::generators::{
    MonocultureGenerator, PolycultureGenerator, PreferenceBundle, PreferenceGenerator,
};
use crate::market::Market;
use crate::noise::NoiseModel;
use crate::students::StudentParams;
use crate::{MarketError, Result};

/// Whether colleges share one evaluation signal or draw their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Culture {
    #[default]
    Monoculture,
    Polyculture,
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Culture::Monoculture => write!(f, "Monoculture"),
            Culture::Polyculture => write!(f, "Polyculture"),
        }
    }
}

/// Preference generator settings
///
/// Access settings are kept as names and parsed when preferences are
/// generated, so a bad name fails there rather than at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub culture: Culture,
    /// Student weight on college quality
    pub beta: f64,
    /// Student weight on squared distance
    pub gamma: f64,
    /// "total" or "uniform"
    pub access_distribution: String,
    /// "top" or "random"
    pub strategy: String,
    /// College evaluation noise
    pub noise: NoiseModel,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            culture: Culture::Monoculture,
            beta: 0.0,
            gamma: 0.0,
            access_distribution: "total".to_string(),
            strategy: "top".to_string(),
            noise: NoiseModel::default(),
        }
    }
}

impl GeneratorConfig {
    /// Same settings under another culture
    pub fn with_culture(&self, culture: Culture) -> Self {
        GeneratorConfig {
            culture,
            ..self.clone()
        }
    }

    pub fn student_params(&self) -> StudentParams {
        StudentParams::new(self.beta, self.gamma)
    }

    pub fn access_policy(&self) -> Result<AccessPolicy> {
        AccessPolicy::from_names(&self.access_distribution, &self.strategy)
    }

    pub fn validate(&self) -> Result<()> {
        self.noise.validate()?;
        self.access_policy()?;
        for (name, weight) in [("beta", self.beta), ("gamma", self.gamma)] {
            if !weight.is_finite() {
                return Err(MarketError::InvalidConfiguration(format!(
                    "{} must be finite, got {}",
                    name, weight
                )));
            }
        }
        Ok(())
    }
}

impl PreferenceGenerator for GeneratorConfig {
    fn generate_prefs<R: Rng + ?Sized>(
        &self,
        n: usize,
        c: usize,
        rng: &mut R,
    ) -> Result<PreferenceBundle> {
        let access = self.access_policy()?;
        let students = self.student_params();
        match self.culture {
            Culture::Monoculture => {
                MonocultureGenerator::new(self.noise, students, access).generate_prefs(n, c, rng)
            }
            Culture::Polyculture => {
                PolycultureGenerator::new(self.noise, students, access).generate_prefs(n, c, rng)
            }
        }
    }
}

/// Everything needed to draw one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub num_students: usize,
    pub num_colleges: usize,
    /// Seats per college, one entry per college
    pub college_capacities: Vec<usize>,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl MarketConfig {
    /// Every college gets the same number of seats
    pub fn uniform_capacity(num_students: usize, num_colleges: usize, capacity: usize) -> Self {
        MarketConfig {
            num_students,
            num_colleges,
            college_capacities: vec![capacity; num_colleges],
            generator: GeneratorConfig::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: MarketConfig =
            toml::from_str(s).map_err(|e| MarketError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| MarketError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| MarketError::Config(e.to_string()))
    }

    pub fn total_capacity(&self) -> usize {
        self.college_capacities.iter().sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_students <= 1 {
            return Err(MarketError::DegenerateInput(format!(
                "need at least two students, got {}",
                self.num_students
            )));
        }
        if self.num_colleges == 0 {
            return Err(MarketError::DegenerateInput("no colleges".to_string()));
        }
        if self.college_capacities.len() != self.num_colleges {
            return Err(MarketError::InvalidConfiguration(format!(
                "{} capacities for {} colleges",
                self.college_capacities.len(),
                self.num_colleges
            )));
        }
        if self.college_capacities.contains(&0) {
            return Err(MarketError::InvalidConfiguration(
                "college capacities must be positive".to_string(),
            ));
        }
        self.generator.validate()
    }

    /// Draw one market from this configuration
    pub fn build_market<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Market> {
        Market::new(
            self.num_students,
            self.num_colleges,
            self.college_capacities.clone(),
            &self.generator,
            rng,
        )
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig::uniform_capacity(100, 10, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessDistribution, ApplicationStrategy};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn parses_full_toml() {
        let config = MarketConfig::from_toml_str(
            r#"
            num_students = 40
            num_colleges = 3
            college_capacities = [5, 5, 10]

            [generator]
            culture = "polyculture"
            noise = { kind = "logistic", scale = 0.2 }
            beta = 1.5
            access_distribution = "uniform"
            strategy = "random"
            "#,
        )
        .unwrap();

        assert_eq!(config.total_capacity(), 20);
        assert_eq!(config.generator.culture, Culture::Polyculture);
        assert_eq!(config.generator.noise, NoiseModel::Logistic { scale: 0.2 });
        assert_eq!(config.generator.gamma, 0.0);
        assert_eq!(
            config.generator.access_policy().unwrap(),
            AccessPolicy::new(AccessDistribution::Uniform, ApplicationStrategy::Random)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn generator_section_is_optional() {
        let config = MarketConfig::from_toml_str(
            "num_students = 10\nnum_colleges = 2\ncollege_capacities = [2, 2]\n",
        )
        .unwrap();
        assert_eq!(config.generator, GeneratorConfig::default());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = MarketConfig::from_toml_str("num_students = \"many\"").unwrap_err();
        assert!(matches!(err, MarketError::Config(_)));
    }

    #[test]
    fn toml_round_trip() {
        let mut config = MarketConfig::uniform_capacity(30, 3, 4);
        config.generator.noise = NoiseModel::Uniform { half_width: 0.5 };
        let text = config.to_toml_string().unwrap();
        assert_eq!(MarketConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn strategy_is_ignored_under_total_access() {
        let mut config = MarketConfig::uniform_capacity(10, 2, 3);
        config.generator.strategy = "bogus".to_string();

        assert!(config.validate().is_ok());
        let market = config.build_market(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(market.num_apps_submitted(), vec![2; 10].as_slice());

        config.generator.access_distribution = "uniform".to_string();
        let err = config
            .build_market(&mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidConfiguration(_)));
    }

    #[test]
    fn bad_strategy_fails_at_generation() {
        let mut config = MarketConfig::uniform_capacity(10, 2, 3);
        config.generator.access_distribution = "uniform".to_string();
        config.generator.strategy = "cheapest".to_string();

        assert!(matches!(
            config.validate(),
            Err(MarketError::InvalidConfiguration(_))
        ));
        let err = config
            .build_market(&mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidConfiguration(_)));
    }

    #[test]
    fn bad_access_distribution_fails_at_generation() {
        let mut config = MarketConfig::uniform_capacity(10, 2, 3);
        config.generator.access_distribution = "partial".to_string();
        let err = config
            .build_market(&mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidConfiguration(_)));
    }

    #[test]
    fn capacity_shape_is_validated() {
        let mut config = MarketConfig::default();
        config.college_capacities.pop();
        assert!(matches!(
            config.validate(),
            Err(MarketError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            MarketConfig::uniform_capacity(1, 2, 1).validate(),
            Err(MarketError::DegenerateInput(_))
        ));
    }

    #[test]
    fn culture_dispatch_matches_generators() {
        let config = GeneratorConfig {
            noise: NoiseModel::Normal { std_dev: 0.2 },
            ..Default::default()
        };
        let direct = MonocultureGenerator::new(
            config.noise,
            config.student_params(),
            config.access_policy().unwrap(),
        )
        .generate_prefs(15, 3, &mut StdRng::seed_from_u64(8))
        .unwrap();
        let via_config = config
            .generate_prefs(15, 3, &mut StdRng::seed_from_u64(8))
            .unwrap();
        assert_eq!(direct, via_config);

        let poly = config
            .with_culture(Culture::Polyculture)
            .generate_prefs(15, 3, &mut StdRng::seed_from_u64(8))
            .unwrap();
        // Student side draws come first, so it is identical across cultures
        assert_eq!(poly.true_student, direct.true_student);
    }
}
