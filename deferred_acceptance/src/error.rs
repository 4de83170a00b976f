use thiserror::Error;

/// Malformed input to the matching engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("{colleges} college preference lists but {capacities} capacities")]
    CapacityMismatch { colleges: usize, capacities: usize },

    #[error("student {student} ranks unknown college {college}")]
    UnknownCollege { student: usize, college: usize },

    #[error("college {college} ranks unknown student {student}")]
    UnknownStudent { college: usize, student: usize },

    #[error("student {student} ranks college {college} more than once")]
    DuplicateCollege { student: usize, college: usize },

    #[error("college {college} ranks student {student} more than once")]
    DuplicateStudent { college: usize, student: usize },
}

pub type MatchResult<T> = std::result::Result<T, MatchError>;
