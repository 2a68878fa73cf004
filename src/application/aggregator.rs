use super::scope::{AbortOnDrop, TaskScope};
use super::Aggregator;
use crate::domain::{
    errors::{AggregatorError, SourceError},
    models::{
        AggregatedResult, Branch, CommentFetcher, FriendFetcher, User, UserId, UserResolver,
    },
};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use typed_builder::TypedBuilder;

/// Time each dependent branch gets before it falls back to an empty result.
pub const DEFAULT_BRANCH_TIMEOUT: Duration = Duration::from_millis(2000);

/// The user resolution of one call, computed once and awaited by both
/// dependent branches.
type SharedUser = Shared<BoxFuture<'static, Result<User, AggregatorError>>>;

#[derive(TypedBuilder)]
pub struct UserDataAggregator<R, C, F> {
    #[builder(setter(transform = |user_resolver: R| Arc::new(user_resolver)))]
    user_resolver: Arc<R>,
    #[builder(setter(transform = |comment_fetcher: C| Arc::new(comment_fetcher)))]
    comment_fetcher: Arc<C>,
    #[builder(setter(transform = |friend_fetcher: F| Arc::new(friend_fetcher)))]
    friend_fetcher: Arc<F>,
    /// Applies to comments and friends only. User resolution is unbounded.
    #[builder(default = DEFAULT_BRANCH_TIMEOUT)]
    branch_timeout: Duration,
    #[builder(default, setter(skip))]
    scope: TaskScope,
}

impl<R, C, F> UserDataAggregator<R, C, F>
where
    R: UserResolver + Send + Sync + 'static,
    C: CommentFetcher + Send + Sync + 'static,
    F: FriendFetcher + Send + Sync + 'static,
{
    /// Creates an aggregator using [`DEFAULT_BRANCH_TIMEOUT`].
    pub fn new(user_resolver: R, comment_fetcher: C, friend_fetcher: F) -> Self {
        Self::builder()
            .user_resolver(user_resolver)
            .comment_fetcher(comment_fetcher)
            .friend_fetcher(friend_fetcher)
            .build()
    }

    pub fn branch_timeout(&self) -> Duration {
        self.branch_timeout
    }

    fn spawn_user(&self) -> JoinHandle<Result<User, AggregatorError>> {
        let resolver = self.user_resolver.clone();
        self.scope.spawn(async move {
            resolver
                .resolve_user()
                .await
                .map_err(AggregatorError::FailedToResolveUser)
        })
    }
}

#[async_trait::async_trait]
impl<R, C, F> Aggregator for UserDataAggregator<R, C, F>
where
    R: UserResolver + Send + Sync + 'static,
    C: CommentFetcher + Send + Sync + 'static,
    F: FriendFetcher + Send + Sync + 'static,
{
    async fn aggregate(&self) -> Result<AggregatedResult, AggregatorError> {
        if self.scope.is_closed() {
            return Err(AggregatorError::ScopeClosed);
        }
        tracing::debug!("Aggregating data for current user ...");

        let mut in_flight = AbortOnDrop::default();

        let user_task = self.spawn_user();
        in_flight.track(&user_task);
        let user: SharedUser = join(user_task).boxed().shared();

        let fetcher = self.comment_fetcher.clone();
        let comments_task = self.scope.spawn(bounded_branch(
            Branch::Comments,
            user.clone(),
            self.branch_timeout,
            move |user_id| async move { fetcher.fetch_comments(user_id).await },
        ));
        in_flight.track(&comments_task);

        let fetcher = self.friend_fetcher.clone();
        let friends_task = self.scope.spawn(bounded_branch(
            Branch::Friends,
            user.clone(),
            self.branch_timeout,
            move |user_id| async move { fetcher.fetch_friends(user_id).await },
        ));
        in_flight.track(&friends_task);

        let (user, comments, suggested_friends) =
            tokio::try_join!(user, join(comments_task), join(friends_task))?;

        tracing::info!(
            "Aggregated {} comments and {} suggested friends for user {}",
            comments.len(),
            suggested_friends.len(),
            user.id
        );
        Ok(AggregatedResult {
            user,
            comments,
            suggested_friends,
        })
    }

    fn close(&self) {
        if self.scope.close() {
            tracing::info!("Aggregator closed, cancelling outstanding tasks");
        }
    }

    fn is_closed(&self) -> bool {
        self.scope.is_closed()
    }
}

async fn join<T>(task: JoinHandle<Result<T, AggregatorError>>) -> Result<T, AggregatorError> {
    task.await?
}

/// Waits for the user, then runs `fetch` under `limit`. Running out of time
/// yields an empty sequence, any other failure is propagated.
async fn bounded_branch<T, Fut>(
    branch: Branch,
    user: SharedUser,
    limit: Duration,
    fetch: impl FnOnce(UserId) -> Fut,
) -> Result<Vec<T>, AggregatorError>
where
    Fut: Future<Output = Result<Vec<T>, SourceError>>,
{
    let user = user.await?;
    match tokio::time::timeout(limit, fetch(user.id.clone())).await {
        Ok(Ok(items)) => Ok(items),
        Ok(Err(source)) => Err(AggregatorError::FailedToFetch {
            branch,
            user_id: user.id,
            source,
        }),
        Err(_) => {
            tracing::warn!(
                "Fetching {} for user {} took longer than {:?}, using empty result",
                branch,
                user.id,
                limit
            );
            Ok(Vec::new())
        }
    }
}
