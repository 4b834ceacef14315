use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Debug, Default)]
pub struct MemoryFriendshipLedger {
    edges: DashMap<UserPair, Friendship>,
}

impl MemoryFriendshipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an edge as-is, bypassing the engine. Used to seed backdated
    /// friendships.
    pub fn insert(&self, friendship: Friendship) -> Result<(), RelationError> {
        match self.edges.entry(friendship.pair) {
            Entry::Occupied(_) => Err(RelationError::AlreadyFriends),
            Entry::Vacant(slot) => {
                slot.insert(friendship);
                Ok(())
            }
        }
    }
}

#[async_trait::async_trait]
impl FriendshipLedger for MemoryFriendshipLedger {
    async fn create(
        &self,
        pair: UserPair,
        created_on: DateTime<Utc>,
        duration: Validity,
    ) -> Result<Friendship, RelationError> {
        let friendship = Friendship::new(pair, created_on, duration);
        self.insert(friendship.clone())?;
        Ok(friendship)
    }

    async fn pop_by_pair(&self, pair: UserPair) -> Result<Friendship, RelationError> {
        self.edges
            .remove(&pair)
            .map(|(_, friendship)| friendship)
            .ok_or(RelationError::FriendNotFound)
    }

    async fn pop_by_id(
        &self,
        pair: UserPair,
        id: FriendshipId,
    ) -> Result<Option<Friendship>, RelationError> {
        Ok(self
            .edges
            .remove_if(&pair, |_, friendship| friendship.id == id)
            .map(|(_, friendship)| friendship))
    }

    async fn find_by_pair(&self, pair: UserPair) -> Result<Option<Friendship>, RelationError> {
        Ok(self.edges.get(&pair).map(|entry| entry.value().clone()))
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Friendship>, RelationError> {
        Ok(self
            .edges
            .iter()
            .filter(|entry| entry.key().contains(user))
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: u128) -> UserId {
        UserId(uuid::Uuid::from_u128(n))
    }

    #[tokio::test]
    async fn pop_by_id_leaves_a_newer_edge_alone() {
        let ledger = MemoryFriendshipLedger::new();
        let pair = UserPair::new(user(1), user(2));
        let duration = Validity::from_secs(60).unwrap();

        let old = ledger.create(pair, Utc::now(), duration).await.unwrap();
        ledger.pop_by_pair(pair).await.unwrap();
        let new = ledger.create(pair, Utc::now(), duration).await.unwrap();

        assert!(ledger.pop_by_id(pair, old.id).await.unwrap().is_none());
        assert_eq!(ledger.find_by_pair(pair).await.unwrap(), Some(new));
    }

    #[tokio::test]
    async fn duplicate_edge_is_a_conflict() {
        let ledger = MemoryFriendshipLedger::new();
        let duration = Validity::from_secs(60).unwrap();
        ledger
            .create(UserPair::new(user(1), user(2)), Utc::now(), duration)
            .await
            .unwrap();

        let again = ledger
            .create(UserPair::new(user(2), user(1)), Utc::now(), duration)
            .await;
        assert!(matches!(again, Err(RelationError::AlreadyFriends)));
        assert_eq!(ledger.list_for_user(user(2)).await.unwrap().len(), 1);
    }
}
