use std::collections::VecDeque;

use deferred_acceptance::{get_match, Matching};
use log::{debug, warn};
use rand::Rng;

use crate::generators::{PreferenceBundle, PreferenceGenerator};
use crate::{MarketError, Result};

/// One simulated admissions market.
///
/// Preferences are drawn once at construction and the stable matching is
/// computed from the approximate (submitted / noisy) preferences. Every
/// query scores that matching against the true preferences.
#[derive(Debug, Clone)]
pub struct Market {
    n: usize,
    c: usize,
    college_caps: Vec<usize>,
    true_student_prefs: Vec<Vec<usize>>,
    approx_student_prefs: Vec<Vec<usize>>,
    true_college_prefs: Vec<Vec<usize>>,
    approx_college_prefs: Vec<Vec<usize>>,
    num_apps: Vec<usize>,
    student_percentile: Option<Vec<f64>>,
    matching: Matching,
}

fn is_permutation(list: &[usize], len: usize) -> bool {
    let mut seen = vec![false; len];
    list.len() == len
        && list
            .iter()
            .all(|&x| x < len && !std::mem::replace(&mut seen[x], true))
}

impl Market {
    /// Draw preferences from `generator` and match on the approximate ones
    pub fn new<G, R>(
        n: usize,
        c: usize,
        college_caps: Vec<usize>,
        generator: &G,
        rng: &mut R,
    ) -> Result<Self>
    where
        G: PreferenceGenerator,
        R: Rng + ?Sized,
    {
        Self::check_shape(n, c, &college_caps)?;
        let bundle = generator.generate_prefs(n, c, rng)?;
        Self::from_bundle(n, c, college_caps, bundle)
    }

    /// Build a market from preferences that are already drawn
    pub fn from_bundle(
        n: usize,
        c: usize,
        college_caps: Vec<usize>,
        bundle: PreferenceBundle,
    ) -> Result<Self> {
        Self::check_shape(n, c, &college_caps)?;
        Self::check_bundle(n, c, &bundle)?;

        let student_percentile = bundle
            .true_college_shared
            .then(|| (0..n).map(|i| i as f64 / (n - 1) as f64).collect());

        let matching = get_match(&bundle.approx_student, &bundle.approx_college, &college_caps)?;
        let matched = matching.num_matched();
        if matched == 0 {
            warn!("market with {} students and {} colleges matched nobody", n, c);
        } else {
            debug!(
                "market built: {}/{} students matched, {} seats",
                matched,
                n,
                college_caps.iter().sum::<usize>()
            );
        }

        Ok(Market {
            n,
            c,
            college_caps,
            true_student_prefs: bundle.true_student,
            approx_student_prefs: bundle.approx_student,
            true_college_prefs: bundle.true_college,
            approx_college_prefs: bundle.approx_college,
            num_apps: bundle.num_apps,
            student_percentile,
            matching,
        })
    }

    fn check_shape(n: usize, c: usize, college_caps: &[usize]) -> Result<()> {
        if n <= 1 {
            return Err(MarketError::DegenerateInput(format!(
                "percentile ranks need at least two students, got {}",
                n
            )));
        }
        if c == 0 {
            return Err(MarketError::DegenerateInput("no colleges".to_string()));
        }
        if college_caps.len() != c {
            return Err(MarketError::InvalidConfiguration(format!(
                "{} capacities for {} colleges",
                college_caps.len(),
                c
            )));
        }
        if let Some(college) = college_caps.iter().position(|&cap| cap == 0) {
            return Err(MarketError::InvalidConfiguration(format!(
                "college {} has zero capacity",
                college
            )));
        }
        Ok(())
    }

    fn check_bundle(n: usize, c: usize, bundle: &PreferenceBundle) -> Result<()> {
        let sizes = [
            ("true student", bundle.true_student.len(), n),
            ("approximate student", bundle.approx_student.len(), n),
            ("application count", bundle.num_apps.len(), n),
            ("true college", bundle.true_college.len(), c),
            ("approximate college", bundle.approx_college.len(), c),
        ];
        for (what, got, want) in sizes {
            if got != want {
                return Err(MarketError::InvalidConfiguration(format!(
                    "{} preferences cover {} agents, expected {}",
                    what, got, want
                )));
            }
        }
        if let Some(student) = bundle
            .true_student
            .iter()
            .position(|p| !is_permutation(p, c))
        {
            return Err(MarketError::InvalidConfiguration(format!(
                "true preferences of student {} must rank all {} colleges once",
                student, c
            )));
        }
        if let Some(college) = bundle
            .true_college
            .iter()
            .position(|p| !is_permutation(p, n))
        {
            return Err(MarketError::InvalidConfiguration(format!(
                "true preferences of college {} must rank all {} students once",
                college, n
            )));
        }
        Ok(())
    }

    pub fn num_students(&self) -> usize {
        self.n
    }

    pub fn num_colleges(&self) -> usize {
        self.c
    }

    pub fn college_caps(&self) -> &[usize] {
        &self.college_caps
    }

    pub fn true_student_prefs(&self) -> &[Vec<usize>] {
        &self.true_student_prefs
    }

    pub fn approx_student_prefs(&self) -> &[Vec<usize>] {
        &self.approx_student_prefs
    }

    pub fn true_college_prefs(&self) -> &[Vec<usize>] {
        &self.true_college_prefs
    }

    pub fn approx_college_prefs(&self) -> &[Vec<usize>] {
        &self.approx_college_prefs
    }

    /// Percentile of each student in the shared true ranking, if colleges share one
    pub fn student_percentile(&self) -> Option<&[f64]> {
        self.student_percentile.as_deref()
    }

    /// College of each student, `None` if unmatched
    pub fn student_matches(&self) -> &[Option<usize>] {
        &self.matching.student_matches
    }

    pub fn college_matches(&self) -> &[Vec<usize>] {
        &self.matching.college_matches
    }

    pub fn num_matched(&self) -> usize {
        self.matching.num_matched()
    }

    /// Empty seats at each college
    pub fn vacancies(&self) -> Vec<usize> {
        self.matching.vacancies(&self.college_caps)
    }

    /// 1-based rank of each student's college in their true list, 0 if unmatched
    pub fn student_rank_of_matches(&self) -> Vec<usize> {
        self.matching
            .student_matches
            .iter()
            .zip(&self.true_student_prefs)
            .map(|(assigned, prefs)| match assigned {
                Some(college) => prefs.iter().position(|c| c == college).map_or(0, |r| r + 1),
                None => 0,
            })
            .collect()
    }

    pub fn num_apps_submitted(&self) -> &[usize] {
        &self.num_apps
    }

    /// Mean true rank of the matched college, over matched students only
    pub fn student_welfare(&self) -> Result<f64> {
        let matched = self.num_matched();
        if matched == 0 {
            return Err(MarketError::NoMatches);
        }
        let total: usize = self.student_rank_of_matches().iter().sum();
        Ok(total as f64 / matched as f64)
    }

    /// Percentiles of the students seated at each college, 0.0 for empty seats.
    ///
    /// Seats are filled by pushing each match (in student order) onto the
    /// front and dropping a placeholder from the back, so filled seats come
    /// out highest student index first.
    pub fn college_percentile_of_matches(&self) -> Vec<Vec<f64>> {
        let mut seats: Vec<VecDeque<f64>> = self
            .college_caps
            .iter()
            .map(|&cap| VecDeque::from(vec![0.0; cap]))
            .collect();
        let scale = (self.n - 1) as f64;

        for (student, assigned) in self.matching.student_matches.iter().enumerate() {
            if let Some(college) = *assigned {
                let slots = &mut seats[college];
                slots.push_front(student as f64 / scale);
                slots.pop_back();
            }
        }
        seats.into_iter().map(Vec::from).collect()
    }

    /// Mean true percentile of admitted students over all seats.
    ///
    /// Empty seats count as 0th percentile, so the sum is divided by total
    /// capacity rather than by the number matched.
    pub fn college_welfare(&self) -> f64 {
        let scale = (self.n - 1) as f64;
        let total: f64 = self
            .matching
            .student_matches
            .iter()
            .enumerate()
            .filter_map(|(student, assigned)| {
                let college = (*assigned)?;
                let index = self.true_college_prefs[college]
                    .iter()
                    .position(|&s| s == student)?;
                Some(1.0 - index as f64 / scale)
            })
            .sum();
        total / self.college_caps.iter().sum::<usize>() as f64
    }
}
