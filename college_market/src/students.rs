use deferred_acceptance::prefs_from_values;
use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

use crate::noise::Logistic;

/// Weights in the student utility model
///
/// A student's value for a college is a logistic taste shock, minus
/// `gamma` times the squared distance between their locations, plus `beta`
/// times the college's quality.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StudentParams {
    /// Weight on the common quality bonus
    #[serde(default)]
    pub beta: f64,
    /// Weight on squared location distance
    #[serde(default)]
    pub gamma: f64,
}

impl StudentParams {
    pub fn new(beta: f64, gamma: f64) -> Self {
        StudentParams { beta, gamma }
    }

    /// Value of one college to one student
    pub fn value(&self, shock: f64, student_loc: f64, college_loc: f64, quality: f64) -> f64 {
        shock - self.gamma * (student_loc - college_loc).powi(2) + self.beta * quality
    }
}

/// Utility of every college to every student, `n` rows of `c` values
pub fn student_values<R: Rng + ?Sized>(
    n: usize,
    c: usize,
    params: &StudentParams,
    rng: &mut R,
) -> Vec<Vec<f64>> {
    let logistic = Logistic::standard();
    let shocks: Vec<Vec<f64>> = (0..n)
        .map(|_| (0..c).map(|_| logistic.sample(rng)).collect())
        .collect();
    let student_locs: Vec<f64> = (0..n).map(|_| rng.random()).collect();
    let college_locs: Vec<f64> = (0..c).map(|_| rng.random()).collect();
    let qualities: Vec<f64> = (0..c).map(|_| rng.random()).collect();

    shocks
        .iter()
        .zip(&student_locs)
        .map(|(row, &loc)| {
            row.iter()
                .zip(college_locs.iter().zip(&qualities))
                .map(|(&shock, (&college_loc, &quality))| {
                    params.value(shock, loc, college_loc, quality)
                })
                .collect()
        })
        .collect()
}

/// True student preferences: every college, best first
pub fn generate_student_prefs<R: Rng + ?Sized>(
    n: usize,
    c: usize,
    params: &StudentParams,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    prefs_from_values(&student_values(n, c, params, rng))
}
