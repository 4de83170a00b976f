use crate::solver::{check_student_prefs, college_rankings};
use crate::{MatchError, MatchResult, Matching};

/// Pairs (student, college) that would both rather be matched to each other.
///
/// A student blocks with every college listed above their assignment (or
/// anywhere in their list when unmatched) that finds them acceptable and
/// either has a free seat or holds someone it ranks lower.
pub fn blocking_pairs(
    student_prefs: &[Vec<usize>],
    college_prefs: &[Vec<usize>],
    capacities: &[usize],
    matching: &Matching,
) -> MatchResult<Vec<(usize, usize)>> {
    if college_prefs.len() != capacities.len() {
        return Err(MatchError::CapacityMismatch {
            colleges: college_prefs.len(),
            capacities: capacities.len(),
        });
    }
    if matching.college_matches.len() != capacities.len() {
        return Err(MatchError::CapacityMismatch {
            colleges: matching.college_matches.len(),
            capacities: capacities.len(),
        });
    }
    check_student_prefs(student_prefs, capacities.len())?;
    let rankings = college_rankings(college_prefs, student_prefs.len())?;

    // Rank of the weakest student each full college holds
    let cutoffs: Vec<Option<usize>> = matching
        .college_matches
        .iter()
        .zip(capacities)
        .enumerate()
        .map(|(college, (held, &cap))| {
            if held.len() < cap {
                None
            } else {
                held
                    .iter()
                    .filter_map(|&s| rankings[college].get(s).copied().flatten())
                    .max()
            }
        })
        .collect();

    let mut pairs = Vec::new();
    for (student, prefs) in student_prefs.iter().enumerate() {
        let assigned = matching.student_matches.get(student).copied().flatten();
        for &college in prefs {
            if Some(college) == assigned {
                break;
            }
            let Some(rank) = rankings[college][student] else {
                continue;
            };
            let room = match cutoffs[college] {
                None => capacities[college] > 0,
                Some(cutoff) => rank < cutoff,
            };
            if room {
                pairs.push((student, college));
            }
        }
    }
    Ok(pairs)
}

/// True when no blocking pair exists
pub fn is_stable(
    student_prefs: &[Vec<usize>],
    college_prefs: &[Vec<usize>],
    capacities: &[usize],
    matching: &Matching,
) -> MatchResult<bool> {
    Ok(blocking_pairs(student_prefs, college_prefs, capacities, matching)?.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get_match;

    #[test]
    fn swapped_assignment_has_blocking_pair() {
        let student_prefs = vec![vec![0, 1], vec![1, 0]];
        let college_prefs = vec![vec![0, 1], vec![1, 0]];
        let matching = Matching {
            student_matches: vec![Some(1), Some(0)],
            college_matches: vec![vec![1], vec![0]],
        };

        let pairs = blocking_pairs(&student_prefs, &college_prefs, &[1, 1], &matching).unwrap();
        assert_eq!(pairs, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn unmatched_student_blocks_with_free_seat() {
        let matching = Matching {
            student_matches: vec![None],
            college_matches: vec![vec![]],
        };
        let pairs = blocking_pairs(&[vec![0]], &[vec![0]], &[1], &matching).unwrap();
        assert_eq!(pairs, vec![(0, 0)]);
    }

    #[test]
    fn solver_output_is_stable() {
        let student_prefs = vec![vec![0, 1], vec![0, 1], vec![0, 1]];
        let college_prefs = vec![vec![2, 1, 0], vec![0, 1, 2]];
        let capacities = [1, 2];
        let matching = get_match(&student_prefs, &college_prefs, &capacities).unwrap();

        assert_eq!(matching.student_matches, vec![Some(1), Some(1), Some(0)]);
        assert!(is_stable(&student_prefs, &college_prefs, &capacities, &matching).unwrap());
    }
}
