use deferred_acceptance::MatchError;
use thiserror::Error;

/// Failures while generating preferences or scoring a market
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("no student was matched")]
    NoMatches,

    #[error("matching failed: {0}")]
    Matching(#[from] MatchError),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MarketError>;
