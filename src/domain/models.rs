use super::errors::SourceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

pub type UserId = String;

/// The user the aggregation is run for.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct User {
    /// Identifier passed on to the comment and friend sources
    pub id: UserId,
    /// Display name
    pub name: String,
}

/// A comment written by the user.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub content: String,
}

/// A friend suggested to the user.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Friend {
    pub id: String,
    pub name: String,
}

/// Everything gathered for the current user in a single aggregation call.
///
/// `comments` and `suggested_friends` keep the order their source returned
/// and are empty, never missing, when the source ran out of time.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AggregatedResult {
    pub user: User,
    pub comments: Vec<Comment>,
    pub suggested_friends: Vec<Friend>,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Comment {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

impl Friend {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The dependent branches of an aggregation, both keyed by the resolved user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Branch {
    Comments,
    Friends,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Comments => write!(f, "comments"),
            Branch::Friends => write!(f, "suggested friends"),
        }
    }
}

/// Resolves the user the aggregation runs for.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserResolver {
    /// Resolves the current user. May suspend for as long as it needs to.
    async fn resolve_user(&self) -> Result<User, SourceError>;
}

/// Fetches the comments written by a user.
///
/// Implementations do not need to be timeout aware, the aggregator bounds
/// every call itself.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CommentFetcher {
    async fn fetch_comments(&self, user_id: UserId) -> Result<Vec<Comment>, SourceError>;
}

/// Fetches the friends suggested to a user.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FriendFetcher {
    async fn fetch_friends(&self, user_id: UserId) -> Result<Vec<Friend>, SourceError>;
}

#[async_trait::async_trait]
impl<F, Fut> UserResolver for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<User, SourceError>> + Send + 'static,
{
    async fn resolve_user(&self) -> Result<User, SourceError> {
        (self)().await
    }
}

#[async_trait::async_trait]
impl<F, Fut> CommentFetcher for F
where
    F: Fn(UserId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Comment>, SourceError>> + Send + 'static,
{
    async fn fetch_comments(&self, user_id: UserId) -> Result<Vec<Comment>, SourceError> {
        (self)(user_id).await
    }
}

#[async_trait::async_trait]
impl<F, Fut> FriendFetcher for F
where
    F: Fn(UserId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Friend>, SourceError>> + Send + 'static,
{
    async fn fetch_friends(&self, user_id: UserId) -> Result<Vec<Friend>, SourceError> {
        (self)(user_id).await
    }
}
