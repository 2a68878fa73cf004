use crate::domain::{
    errors::SourceError,
    models::{Comment, CommentFetcher, Friend, FriendFetcher, User, UserId, UserResolver},
};
use dashmap::DashMap;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Artificial latency applied by [`InMemoryDirectory`] to each source.
#[derive(Clone, Copy, Debug, Default, TypedBuilder)]
pub struct Latency {
    #[builder(default)]
    pub user: Duration,
    #[builder(default)]
    pub comments: Duration,
    #[builder(default)]
    pub friends: Duration,
}

/// Simulated data source serving every capability the aggregator needs.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    current_user: Option<User>,
    // user id -> comments, in the order they will be returned
    comments: DashMap<UserId, Vec<Comment>>,
    // user id -> suggested friends, in the order they will be returned
    friends: DashMap<UserId, Vec<Friend>>,
    latency: Latency,
}

impl InMemoryDirectory {
    pub fn new(current_user: User, latency: Latency) -> Self {
        Self {
            current_user: Some(current_user),
            latency,
            ..Default::default()
        }
    }

    pub fn with_comments(self, user_id: impl Into<UserId>, comments: Vec<Comment>) -> Self {
        self.comments
            .entry(user_id.into())
            .or_default()
            .extend(comments);
        self
    }

    pub fn with_friends(self, user_id: impl Into<UserId>, friends: Vec<Friend>) -> Self {
        self.friends
            .entry(user_id.into())
            .or_default()
            .extend(friends);
        self
    }

    async fn delay(duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

#[async_trait::async_trait]
impl UserResolver for InMemoryDirectory {
    async fn resolve_user(&self) -> Result<User, SourceError> {
        Self::delay(self.latency.user).await;
        self.current_user
            .clone()
            .ok_or_else(|| SourceError::NotFound("current user".to_string()))
    }
}

#[async_trait::async_trait]
impl CommentFetcher for InMemoryDirectory {
    async fn fetch_comments(&self, user_id: UserId) -> Result<Vec<Comment>, SourceError> {
        Self::delay(self.latency.comments).await;
        tracing::debug!("Serving comments for user {}", user_id);
        Ok(self
            .comments
            .get(&user_id)
            .map(|v| v.value().clone())
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl FriendFetcher for InMemoryDirectory {
    async fn fetch_friends(&self, user_id: UserId) -> Result<Vec<Friend>, SourceError> {
        Self::delay(self.latency.friends).await;
        tracing::debug!("Serving suggested friends for user {}", user_id);
        Ok(self
            .friends
            .get(&user_id)
            .map(|v| v.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn serves_records_for_the_requested_user_only() {
        let directory = InMemoryDirectory::new(User::new("12", "nagy"), Latency::default())
            .with_comments("12", vec![Comment::new("1", "first"), Comment::new("2", "second")])
            .with_friends("99", vec![Friend::new("233", "ahmed")]);

        let comments = assert_ok!(directory.fetch_comments("12".into()).await);
        let friends = assert_ok!(directory.fetch_friends("12".into()).await);

        assert_eq!(
            comments,
            vec![Comment::new("1", "first"), Comment::new("2", "second")]
        );
        assert!(friends.is_empty());
    }

    #[tokio::test]
    async fn missing_current_user_is_not_found() {
        let directory = InMemoryDirectory::default();

        let err = assert_err!(directory.resolve_user().await);

        assert_eq!(err, SourceError::NotFound("current user".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_applied_per_source() {
        let latency = Latency::builder()
            .comments(Duration::from_millis(500))
            .build();
        let directory = InMemoryDirectory::new(User::new("12", "nagy"), latency);
        let start = tokio::time::Instant::now();

        assert_ok!(directory.resolve_user().await);
        assert!(start.elapsed() < Duration::from_millis(1));

        assert_ok!(directory.fetch_comments("12".into()).await);
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
