//! Error types for the match server

use shared::UnknownTimeControl;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// No match is registered under this code
    #[error("Invalid match code: {0}")]
    InvalidCode(String),

    #[error(transparent)]
    InvalidTimeControl(#[from] UnknownTimeControl),

    #[error("Match is already over")]
    MatchOver,

    /// Both seats are held by live connections
    #[error("Match is full")]
    MatchFull,

    /// Carries the message shown to the requester
    #[error("{0}")]
    CancelRejected(String),

    /// The match task has stopped and no longer accepts commands
    #[error("Match {0} is no longer running")]
    ActorUnavailable(String),
}

pub type ServerResult<T> = Result<T, MatchError>;
