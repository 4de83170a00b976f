use std::collections::BinaryHeap;

use log::{debug, trace};

use crate::{MatchError, MatchResult, Matching};

/// Position of every student in every college's list, `None` if unacceptable
pub(crate) type Rankings = Vec<Vec<Option<usize>>>;

pub(crate) fn college_rankings(
    college_prefs: &[Vec<usize>],
    num_students: usize,
) -> MatchResult<Rankings> {
    college_prefs
        .iter()
        .enumerate()
        .map(|(college, prefs)| {
            let mut ranks = vec![None; num_students];
            for (position, &student) in prefs.iter().enumerate() {
                let slot = ranks
                    .get_mut(student)
                    .ok_or(MatchError::UnknownStudent { college, student })?;
                if slot.is_some() {
                    return Err(MatchError::DuplicateStudent { college, student });
                }
                *slot = Some(position);
            }
            Ok(ranks)
        })
        .collect()
}

pub(crate) fn check_student_prefs(
    student_prefs: &[Vec<usize>],
    num_colleges: usize,
) -> MatchResult<()> {
    for (student, prefs) in student_prefs.iter().enumerate() {
        let mut seen = vec![false; num_colleges];
        for &college in prefs {
            let slot = seen
                .get_mut(college)
                .ok_or(MatchError::UnknownCollege { student, college })?;
            if *slot {
                return Err(MatchError::DuplicateCollege { student, college });
            }
            *slot = true;
        }
    }
    Ok(())
}

/// Student-proposing deferred acceptance with college capacities.
///
/// Student lists may be truncated; a student who runs out of colleges stays
/// unmatched. A student missing from a college's list is never admitted
/// there. The result is the student-optimal stable matching.
pub fn get_match(
    student_prefs: &[Vec<usize>],
    college_prefs: &[Vec<usize>],
    capacities: &[usize],
) -> MatchResult<Matching> {
    if college_prefs.len() != capacities.len() {
        return Err(MatchError::CapacityMismatch {
            colleges: college_prefs.len(),
            capacities: capacities.len(),
        });
    }

    let num_students = student_prefs.len();
    let num_colleges = capacities.len();
    check_student_prefs(student_prefs, num_colleges)?;
    let rankings = college_rankings(college_prefs, num_students)?;

    let mut next_choice = vec![0usize; num_students];
    // Max-heap on rank keeps each college's weakest held student on top
    let mut held: Vec<BinaryHeap<(usize, usize)>> = capacities
        .iter()
        .map(|&cap| BinaryHeap::with_capacity(cap))
        .collect();
    let mut free: Vec<usize> = (0..num_students).rev().collect();
    let mut proposals = 0usize;

    while let Some(student) = free.pop() {
        let Some(&college) = student_prefs[student].get(next_choice[student]) else {
            continue;
        };
        next_choice[student] += 1;
        proposals += 1;

        let Some(rank) = rankings[college][student] else {
            free.push(student);
            continue;
        };

        let seats = &mut held[college];
        if seats.len() < capacities[college] {
            trace!("college {} holds student {} (rank {})", college, student, rank);
            seats.push((rank, student));
            continue;
        }

        match seats.peek() {
            Some(&(worst_rank, worst)) if rank < worst_rank => {
                trace!("college {} swaps student {} for {}", college, worst, student);
                seats.pop();
                seats.push((rank, student));
                free.push(worst);
            }
            _ => free.push(student),
        }
    }

    let mut student_matches = vec![None; num_students];
    let college_matches: Vec<Vec<usize>> = held
        .into_iter()
        .enumerate()
        .map(|(college, seats)| {
            seats
                .into_sorted_vec()
                .into_iter()
                .map(|(_, student)| {
                    student_matches[student] = Some(college);
                    student
                })
                .collect()
        })
        .collect();

    let matching = Matching {
        student_matches,
        college_matches,
    };
    debug!(
        "deferred acceptance: {} proposals, {}/{} students matched",
        proposals,
        matching.num_matched(),
        num_students
    );
    Ok(matching)
}
