use crate::domain::{errors::AggregatorError, models::AggregatedResult};

pub mod aggregator;
pub mod scope;

/// The `Aggregator` trait gathers everything known about the current user.
///
/// An aggregator is `Open` from construction until `close` is called, after
/// which it is `Closed` for good. Closing cancels every task still running
/// on behalf of in-flight `aggregate` calls, which then fail with
/// [`AggregatorError::Cancelled`].
///
/// # Examples
///
/// ```no_run
/// use user_data_aggregator::application::{aggregator::UserDataAggregator, Aggregator};
/// use user_data_aggregator::domain::errors::SourceError;
/// use user_data_aggregator::domain::models::{Comment, Friend, User, UserId};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let aggregator = UserDataAggregator::new(
///     || async { Ok::<_, SourceError>(User::new("12", "nagy")) },
///     |_: UserId| async { Ok::<_, SourceError>(vec![Comment::new("1", "nooooooooo")]) },
///     |_: UserId| async { Ok::<_, SourceError>(vec![Friend::new("233", "ahmed")]) },
/// );
///
/// let result = aggregator.aggregate().await?;
/// assert_eq!(result.user.name, "nagy");
/// aggregator.close();
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// `aggregate` fails when the user cannot be resolved, when a dependent
/// source fails with anything other than running out of time, when the
/// aggregator is closed mid-call and when it was closed beforehand.
#[async_trait::async_trait]
pub trait Aggregator {
    async fn aggregate(&self) -> Result<AggregatedResult, AggregatorError>;

    /// Cancels all outstanding work. Calling it more than once has no
    /// further effect.
    fn close(&self);

    fn is_closed(&self) -> bool;
}
