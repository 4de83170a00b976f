//! Many-to-one stable matching by deferred acceptance.
//!
//! Students propose, colleges with fixed capacities tentatively hold their
//! best proposals so far. Preference orderings are plain index lists, most
//! preferred first, usually built from utility values with
//! [`prefs_from_values`].

pub mod error;
pub mod solver;
pub mod stability;

pub use error::{MatchError, MatchResult};
pub use solver::get_match;
pub use stability::{blocking_pairs, is_stable};

/// Outcome of a matching round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    /// College assigned to each student, `None` if unmatched
    pub student_matches: Vec<Option<usize>>,
    /// Students held by each college, best first by the college's ranking
    pub college_matches: Vec<Vec<usize>>,
}

impl Matching {
    /// Number of students holding a seat
    pub fn num_matched(&self) -> usize {
        self.student_matches.iter().filter(|m| m.is_some()).count()
    }

    /// Seats left empty at each college
    pub fn vacancies(&self, capacities: &[usize]) -> Vec<usize> {
        capacities
            .iter()
            .zip(&self.college_matches)
            .map(|(&cap, held)| cap.saturating_sub(held.len()))
            .collect()
    }
}

/// Convert value vectors into orderings, highest value first.
///
/// Sorting is stable, so equal values keep ascending index order. NaN is
/// ordered with `f64::total_cmp` and never panics.
pub fn prefs_from_values(values: &[Vec<f64>]) -> Vec<Vec<usize>> {
    values.iter().map(|v| ordering_from_values(v)).collect()
}

/// Ordering for a single value vector
pub fn ordering_from_values(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_descending_permutation() {
        let values = vec![0.3, -1.2, 4.0, 0.9];
        let order = ordering_from_values(&values);

        assert_eq!(order, vec![2, 3, 0, 1]);
        for pair in order.windows(2) {
            assert!(values[pair[0]] >= values[pair[1]]);
        }
    }

    #[test]
    fn ties_keep_index_order() {
        let order = ordering_from_values(&[1.0, 2.0, 1.0, 2.0]);
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn nan_still_gives_permutation() {
        let mut order = ordering_from_values(&[f64::NAN, 1.0, 0.5]);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn one_ordering_per_vector() {
        let prefs = prefs_from_values(&[vec![5.0, 1.0], vec![1.0, 5.0], vec![]]);
        assert_eq!(prefs, vec![vec![0, 1], vec![1, 0], vec![]]);
    }

    #[test]
    fn vacancies_count_empty_seats() {
        let matching = Matching {
            student_matches: vec![Some(0), None, Some(0)],
            college_matches: vec![vec![2, 0], vec![]],
        };
        assert_eq!(matching.num_matched(), 2);
        assert_eq!(matching.vacancies(&[3, 1]), vec![1, 1]);
    }
}
