use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait FriendshipLedger: Send + Sync {
    /// Fails with `AlreadyFriends` if the pair already has an edge.
    async fn create(
        &self,
        pair: UserPair,
        created_on: DateTime<Utc>,
        duration: Validity,
    ) -> Result<Friendship, RelationError>;

    /// Atomically reads and removes the edge for `pair`; `FriendNotFound` if absent.
    async fn pop_by_pair(&self, pair: UserPair) -> Result<Friendship, RelationError>;

    /// Removes the edge for `pair` only if it is still the edge `id`.
    async fn pop_by_id(
        &self,
        pair: UserPair,
        id: FriendshipId,
    ) -> Result<Option<Friendship>, RelationError>;

    async fn find_by_pair(&self, pair: UserPair) -> Result<Option<Friendship>, RelationError>;

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Friendship>, RelationError>;
}
