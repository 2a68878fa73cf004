use super::models::{Branch, UserId};
use thiserror::Error;
use tokio::task::JoinError;

/// Failure reported by one of the injected data sources.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),
    #[error("Record not found: {0}")]
    NotFound(String),
}

/// Reasons an aggregation call can fail.
///
/// A dependent branch running out of time is not among them: that branch
/// falls back to an empty sequence instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("Failed to resolve current user")]
    FailedToResolveUser(#[source] SourceError),
    #[error("Failed to fetch {branch} for user {user_id}")]
    FailedToFetch {
        branch: Branch,
        user_id: UserId,
        #[source]
        source: SourceError,
    },
    #[error("Aggregation cancelled, the aggregator was closed")]
    Cancelled,
    #[error("Aggregator is closed")]
    ScopeClosed,
    #[error("Aggregation task panicked: {0}")]
    TaskPanicked(String),
}

impl From<JoinError> for AggregatorError {
    fn from(err: JoinError) -> Self {
        if err.is_cancelled() {
            AggregatorError::Cancelled
        } else {
            AggregatorError::TaskPanicked(err.to_string())
        }
    }
}
