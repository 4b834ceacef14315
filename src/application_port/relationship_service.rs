use crate::domain_model::*;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("cannot befriend yourself")]
    SelfRequest,
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    #[error("friendship already established")]
    AlreadyFriends,
    #[error("friend request already exists")]
    RequestAlreadyExists,
    #[error("friend request not found")]
    RequestNotFound,
    #[error("friendship not found")]
    FriendNotFound,
    #[error("not allowed: {0}")]
    NotAllowed(String),
    #[error("store error: {0}")]
    Store(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationErrorKind {
    Validation,
    Conflict,
    NotFound,
    Forbidden,
    Store,
}

impl RelationError {
    pub fn kind(&self) -> RelationErrorKind {
        match self {
            RelationError::SelfRequest | RelationError::InvalidDuration(_) => {
                RelationErrorKind::Validation
            }
            RelationError::AlreadyFriends | RelationError::RequestAlreadyExists => {
                RelationErrorKind::Conflict
            }
            RelationError::RequestNotFound | RelationError::FriendNotFound => {
                RelationErrorKind::NotFound
            }
            RelationError::NotAllowed(_) => RelationErrorKind::Forbidden,
            RelationError::Store(_) => RelationErrorKind::Store,
        }
    }
}

/// The read-only view other features (chat, albums, hangouts) gate on.
#[async_trait::async_trait]
pub trait FriendshipCheck: Send + Sync {
    /// True iff a non-expired friendship exists between `a` and `b`.
    async fn is_friend(&self, a: UserId, b: UserId) -> Result<bool, RelationError>;
    /// Ids of everyone `user` is currently friends with.
    async fn get_friends(&self, user: UserId) -> Result<Vec<UserId>, RelationError>;
}

#[async_trait::async_trait]
pub trait RelationshipService: FriendshipCheck {
    async fn send_request(
        &self,
        from: UserId,
        to: UserId,
        duration: Validity,
    ) -> Result<FriendRequest, RelationError>;
    /// Accepts the pending request `from -> to`. Called on behalf of `to`.
    async fn accept_request(&self, from: UserId, to: UserId) -> Result<Friendship, RelationError>;
    /// Rejects the pending request `from -> to`. Called on behalf of `to`.
    async fn reject_request(&self, from: UserId, to: UserId) -> Result<(), RelationError>;
    /// Withdraws the pending request between the two users, whoever sent it.
    async fn remove_request(&self, from: UserId, to: UserId) -> Result<(), RelationError>;
    async fn remove_friend(&self, user: UserId, friend: UserId) -> Result<(), RelationError>;
    async fn get_requests(&self, user: UserId) -> Result<Vec<FriendRequest>, RelationError>;
    async fn sweep_expired(&self, user: UserId) -> Result<SweepReport, RelationError>;
}
