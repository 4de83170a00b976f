//! Preference generators: true and approximate orderings for both sides.
//!
//! Colleges always agree on the true ranking of students, which comes from
//! a single latent quality draw. What they actually use to rank applicants
//! is that quality plus evaluation noise. Under a monoculture every college
//! sees the same noisy score; under a polyculture each college draws its
//! own noise.

use deferred_acceptance::prefs_from_values;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::access::AccessPolicy;
use crate::noise::NoiseModel;
use crate::students::{generate_student_prefs, StudentParams};
use crate::{MarketError, Result};

/// True and approximate preferences for one simulated market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceBundle {
    pub true_student: Vec<Vec<usize>>,
    /// What each student submits, possibly truncated
    pub approx_student: Vec<Vec<usize>>,
    pub true_college: Vec<Vec<usize>>,
    /// What each college ranks by after evaluation noise
    pub approx_college: Vec<Vec<usize>>,
    pub num_apps: Vec<usize>,
    /// Every college has the same true ranking of students
    pub true_college_shared: bool,
}

/// Anything that can produce a preference bundle for `n` students and `c` colleges
pub trait PreferenceGenerator {
    fn generate_prefs<R: Rng + ?Sized>(
        &self,
        n: usize,
        c: usize,
        rng: &mut R,
    ) -> Result<PreferenceBundle>;
}

/// Colleges share one noisy evaluation of every student
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonocultureGenerator {
    pub noise: NoiseModel,
    pub students: StudentParams,
    pub access: AccessPolicy,
}

/// Each college evaluates students with its own independent noise
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolycultureGenerator {
    pub noise: NoiseModel,
    pub students: StudentParams,
    pub access: AccessPolicy,
}

impl MonocultureGenerator {
    pub fn new(noise: NoiseModel, students: StudentParams, access: AccessPolicy) -> Self {
        MonocultureGenerator {
            noise,
            students,
            access,
        }
    }
}

impl PolycultureGenerator {
    pub fn new(noise: NoiseModel, students: StudentParams, access: AccessPolicy) -> Self {
        PolycultureGenerator {
            noise,
            students,
            access,
        }
    }
}

fn check_sizes(n: usize, c: usize) -> Result<()> {
    if n == 0 || c == 0 {
        return Err(MarketError::DegenerateInput(format!(
            "need at least one student and one college, got {} and {}",
            n, c
        )));
    }
    Ok(())
}

/// Student side shared by both cultures: true lists, submitted lists, budgets
fn student_side<R: Rng + ?Sized>(
    n: usize,
    c: usize,
    students: &StudentParams,
    access: &AccessPolicy,
    rng: &mut R,
) -> (Vec<Vec<usize>>, Vec<Vec<usize>>, Vec<usize>) {
    let true_prefs = generate_student_prefs(n, c, students, rng);
    let (submitted, num_apps) = access.limit(&true_prefs, rng);
    (true_prefs, submitted, num_apps)
}

/// Latent student quality, sorted so student `n - 1` is best
fn latent_quality<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<f64> {
    let mut values: Vec<f64> = (0..n).map(|_| rng.random()).collect();
    values.sort_by(f64::total_cmp);
    values
}

fn add(values: &[f64], noise: &[f64]) -> Vec<f64> {
    values.iter().zip(noise).map(|(v, e)| v + e).collect()
}

impl PreferenceGenerator for MonocultureGenerator {
    fn generate_prefs<R: Rng + ?Sized>(
        &self,
        n: usize,
        c: usize,
        rng: &mut R,
    ) -> Result<PreferenceBundle> {
        check_sizes(n, c)?;
        self.noise.validate()?;
        let (true_student, approx_student, num_apps) =
            student_side(n, c, &self.students, &self.access, rng);

        let values = latent_quality(n, rng);
        let scores = add(&values, &self.noise.sample_vec(n, rng)?);

        Ok(PreferenceBundle {
            true_student,
            approx_student,
            true_college: prefs_from_values(&vec![values; c]),
            approx_college: prefs_from_values(&vec![scores; c]),
            num_apps,
            true_college_shared: true,
        })
    }
}

impl PreferenceGenerator for PolycultureGenerator {
    fn generate_prefs<R: Rng + ?Sized>(
        &self,
        n: usize,
        c: usize,
        rng: &mut R,
    ) -> Result<PreferenceBundle> {
        check_sizes(n, c)?;
        self.noise.validate()?;
        let (true_student, approx_student, num_apps) =
            student_side(n, c, &self.students, &self.access, rng);

        let values = latent_quality(n, rng);
        let mut college_values = Vec::with_capacity(c);
        for _ in 0..c {
            college_values.push(add(&values, &self.noise.sample_vec(n, rng)?));
        }

        Ok(PreferenceBundle {
            true_student,
            approx_student,
            true_college: prefs_from_values(&vec![values; c]),
            approx_college: prefs_from_values(&college_values),
            num_apps,
            true_college_shared: true,
        })
    }
}

/// Hands back a fixed bundle, ignoring the random source
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPreferences {
    bundle: PreferenceBundle,
}

impl FixedPreferences {
    pub fn new(bundle: PreferenceBundle) -> Self {
        FixedPreferences { bundle }
    }

    /// Same lists for true and approximate preferences, full access
    pub fn exact(student_prefs: Vec<Vec<usize>>, college_prefs: Vec<Vec<usize>>) -> Self {
        let num_colleges = college_prefs.len();
        let shared = college_prefs.windows(2).all(|w| w[0] == w[1]);
        FixedPreferences::new(PreferenceBundle {
            num_apps: vec![num_colleges; student_prefs.len()],
            approx_student: student_prefs.clone(),
            true_student: student_prefs,
            approx_college: college_prefs.clone(),
            true_college: college_prefs,
            true_college_shared: shared,
        })
    }
}

impl PreferenceGenerator for FixedPreferences {
    fn generate_prefs<R: Rng + ?Sized>(
        &self,
        n: usize,
        c: usize,
        _rng: &mut R,
    ) -> Result<PreferenceBundle> {
        check_sizes(n, c)?;
        if self.bundle.true_student.len() != n || self.bundle.true_college.len() != c {
            return Err(MarketError::InvalidConfiguration(format!(
                "fixed preferences cover {} students and {} colleges, asked for {} and {}",
                self.bundle.true_student.len(),
                self.bundle.true_college.len(),
                n,
                c
            )));
        }
        Ok(self.bundle.clone())
    }
}
