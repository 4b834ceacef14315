use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Request ledger held in process memory.
///
/// Pending requests are keyed by their canonical pair, so the map itself
/// enforces "one pending request per pair". Resolved requests live in a
/// separate append-only audit map.
#[derive(Debug, Default)]
pub struct MemoryRequestLedger {
    pending: DashMap<UserPair, FriendRequest>,
    history: DashMap<RequestId, FriendRequest>,
}

impl MemoryRequestLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RequestLedger for MemoryRequestLedger {
    async fn create(
        &self,
        from: UserId,
        to: UserId,
        duration: Validity,
        requested_at: DateTime<Utc>,
    ) -> Result<FriendRequest, RelationError> {
        let request = FriendRequest::pending(from, to, duration, requested_at);
        match self.pending.entry(request.pair()) {
            Entry::Occupied(_) => Err(RelationError::RequestAlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(request.clone());
                Ok(request)
            }
        }
    }

    async fn record(&self, request: &FriendRequest) -> Result<(), RelationError> {
        if request.is_pending() {
            return Err(RelationError::Store(format!(
                "audit record {} must be resolved",
                request.id
            )));
        }
        self.history.insert(request.id, request.clone());
        Ok(())
    }

    async fn pop_pending(&self, filter: PendingFilter) -> Result<FriendRequest, RelationError> {
        self.pending
            .remove_if(&filter.pair(), |_, request| filter.matches(request))
            .map(|(_, request)| request)
            .ok_or(RelationError::RequestNotFound)
    }

    async fn find_pending(&self, pair: UserPair) -> Result<Option<FriendRequest>, RelationError> {
        Ok(self.pending.get(&pair).map(|entry| entry.value().clone()))
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<FriendRequest>, RelationError> {
        let mut requests: Vec<FriendRequest> = self
            .pending
            .iter()
            .map(|entry| entry.value().clone())
            .chain(self.history.iter().map(|entry| entry.value().clone()))
            .filter(|request| request.involves(user))
            .collect();
        requests.sort_by_key(|request| request.requested_at);
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: u128) -> UserId {
        UserId(uuid::Uuid::from_u128(n))
    }

    fn secs(n: u64) -> Validity {
        Validity::from_secs(n).unwrap()
    }

    #[tokio::test]
    async fn second_pending_request_for_pair_is_refused() {
        let ledger = MemoryRequestLedger::new();
        ledger.create(user(1), user(2), secs(60), Utc::now()).await.unwrap();

        let reversed = ledger.create(user(2), user(1), secs(60), Utc::now()).await;
        assert!(matches!(reversed, Err(RelationError::RequestAlreadyExists)));
    }

    #[tokio::test]
    async fn directed_pop_ignores_the_reverse_direction() {
        let ledger = MemoryRequestLedger::new();
        ledger.create(user(1), user(2), secs(60), Utc::now()).await.unwrap();

        let wrong_way = ledger
            .pop_pending(PendingFilter::Directed { from: user(2), to: user(1) })
            .await;
        assert!(matches!(wrong_way, Err(RelationError::RequestNotFound)));

        let popped = ledger
            .pop_pending(PendingFilter::Directed { from: user(1), to: user(2) })
            .await
            .unwrap();
        assert_eq!(popped.from, user(1));
        assert!(ledger.find_pending(popped.pair()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_includes_history_in_request_order() {
        let ledger = MemoryRequestLedger::new();
        let start = Utc::now();
        let first = ledger.create(user(1), user(2), secs(60), start).await.unwrap();
        let popped = ledger
            .pop_pending(PendingFilter::Pair(first.pair()))
            .await
            .unwrap();
        ledger
            .record(&popped.resolved(RequestStatus::Rejected, start + chrono::TimeDelta::seconds(1)))
            .await
            .unwrap();
        ledger
            .create(user(3), user(1), secs(60), start + chrono::TimeDelta::seconds(2))
            .await
            .unwrap();
        ledger.create(user(4), user(5), secs(60), start).await.unwrap();

        let listed = ledger.list_for_user(user(1)).await.unwrap();
        let statuses: Vec<_> = listed.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![RequestStatus::Rejected, RequestStatus::Pending]);
        assert!(listed[0].duration.is_none());
    }
}
