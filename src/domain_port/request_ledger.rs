use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

/// Selects the pending request to pop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PendingFilter {
    /// Only a request sent by `from` to `to`.
    Directed { from: UserId, to: UserId },
    /// A request between the two users in either direction.
    Pair(UserPair),
}

impl PendingFilter {
    pub fn pair(&self) -> UserPair {
        match *self {
            PendingFilter::Directed { from, to } => UserPair::new(from, to),
            PendingFilter::Pair(pair) => pair,
        }
    }

    pub fn matches(&self, request: &FriendRequest) -> bool {
        if !request.is_pending() {
            return false;
        }
        match *self {
            PendingFilter::Directed { from, to } => request.from == from && request.to == to,
            PendingFilter::Pair(pair) => request.pair() == pair,
        }
    }
}

#[async_trait::async_trait]
pub trait RequestLedger: Send + Sync {
    /// Writes a new pending request. Fails with `RequestAlreadyExists` if the
    /// pair already has one pending, so concurrent senders cannot both win.
    async fn create(
        &self,
        from: UserId,
        to: UserId,
        duration: Validity,
        requested_at: DateTime<Utc>,
    ) -> Result<FriendRequest, RelationError>;

    /// Appends a terminal (accepted/rejected) audit record.
    async fn record(&self, request: &FriendRequest) -> Result<(), RelationError>;

    /// Atomically reads and removes the pending request matching `filter`.
    async fn pop_pending(&self, filter: PendingFilter) -> Result<FriendRequest, RelationError>;

    async fn find_pending(&self, pair: UserPair) -> Result<Option<FriendRequest>, RelationError>;

    /// Every request touching `user`, of any status, oldest first.
    async fn list_for_user(&self, user: UserId) -> Result<Vec<FriendRequest>, RelationError>;
}
