use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

/// Tunables for the engine, usually read from settings.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipPolicy {
    /// Longest validity window a request may ask for.
    pub max_duration: Validity,
    /// Sweep expired friendships before listing friends.
    pub sweep_on_read: bool,
}

impl Default for RelationshipPolicy {
    fn default() -> Self {
        Self {
            max_duration: Validity::ONE_YEAR,
            sweep_on_read: true,
        }
    }
}

pub struct RealRelationshipService {
    request_ledger: Arc<dyn RequestLedger>,
    friendship_ledger: Arc<dyn FriendshipLedger>,
    clock: Arc<dyn Clock>,
    policy: RelationshipPolicy,
}

impl RealRelationshipService {
    pub fn new(
        request_ledger: Arc<dyn RequestLedger>,
        friendship_ledger: Arc<dyn FriendshipLedger>,
        clock: Arc<dyn Clock>,
        policy: RelationshipPolicy,
    ) -> Self {
        Self {
            request_ledger,
            friendship_ledger,
            clock,
            policy,
        }
    }

    /// Pops the pending `from -> to` request on behalf of `to`.
    async fn take_pending(&self, from: UserId, to: UserId) -> Result<FriendRequest, RelationError> {
        if from == to {
            return Err(RelationError::SelfRequest);
        }
        match self
            .request_ledger
            .pop_pending(PendingFilter::Directed { from, to })
            .await
        {
            Err(RelationError::RequestNotFound) => {
                // the only pending request runs the other way: `to` sent it
                match self.request_ledger.find_pending(UserPair::new(from, to)).await? {
                    Some(_) => Err(RelationError::NotAllowed(format!(
                        "{to} cannot answer its own request to {from}"
                    ))),
                    None => Err(RelationError::RequestNotFound),
                }
            }
            other => other,
        }
    }
}

#[async_trait::async_trait]
impl FriendshipCheck for RealRelationshipService {
    async fn is_friend(&self, a: UserId, b: UserId) -> Result<bool, RelationError> {
        if a == b {
            return Ok(false);
        }
        let now = self.clock.now();
        Ok(self
            .friendship_ledger
            .find_by_pair(UserPair::new(a, b))
            .await?
            .is_some_and(|friendship| !friendship.is_expired(now)))
    }

    async fn get_friends(&self, user: UserId) -> Result<Vec<UserId>, RelationError> {
        if self.policy.sweep_on_read {
            self.sweep_expired(user).await?;
        }
        let now = self.clock.now();
        Ok(self
            .friendship_ledger
            .list_for_user(user)
            .await?
            .into_iter()
            .filter(|friendship| !friendship.is_expired(now))
            .filter_map(|friendship| friendship.pair.other(user))
            .collect())
    }
}

#[async_trait::async_trait]
impl RelationshipService for RealRelationshipService {
    async fn send_request(
        &self,
        from: UserId,
        to: UserId,
        duration: Validity,
    ) -> Result<FriendRequest, RelationError> {
        if from == to {
            return Err(RelationError::SelfRequest);
        }
        if duration > self.policy.max_duration {
            return Err(RelationError::InvalidDuration(format!(
                "{duration} exceeds the maximum of {}",
                self.policy.max_duration
            )));
        }

        let pair = UserPair::new(from, to);
        let now = self.clock.now();

        if let Some(friendship) = self.friendship_ledger.find_by_pair(pair).await? {
            if !friendship.is_expired(now) {
                return Err(RelationError::AlreadyFriends);
            }
            // expired but not swept yet
            self.friendship_ledger
                .pop_by_id(pair, friendship.id)
                .await?;
            debug!(%pair, "dropped expired friendship before new request");
        }

        if self.request_ledger.find_pending(pair).await?.is_some() {
            return Err(RelationError::RequestAlreadyExists);
        }

        let request = self.request_ledger.create(from, to, duration, now).await?;
        debug!(%from, %to, %duration, "friend request sent");
        Ok(request)
    }

    async fn accept_request(&self, from: UserId, to: UserId) -> Result<Friendship, RelationError> {
        let request = self.take_pending(from, to).await?;
        let duration = request.duration.ok_or_else(|| {
            RelationError::Store(format!("pending request {} has no duration", request.id))
        })?;
        let now = self.clock.now();

        // Independent writes: a crash between them leaves an audit record
        // without an edge, which a new request repairs.
        let audit = request.resolved(RequestStatus::Accepted, now);
        let (audit_res, edge_res) = tokio::join!(
            self.request_ledger.record(&audit),
            self.friendship_ledger.create(request.pair(), now, duration)
        );
        let friendship = edge_res?;
        audit_res?;

        info!(%from, %to, expires_at = %friendship.expires_at(), "friend request accepted");
        Ok(friendship)
    }

    async fn reject_request(&self, from: UserId, to: UserId) -> Result<(), RelationError> {
        let request = self.take_pending(from, to).await?;
        let audit = request.resolved(RequestStatus::Rejected, self.clock.now());
        self.request_ledger.record(&audit).await?;

        debug!(%from, %to, "friend request rejected");
        Ok(())
    }

    async fn remove_request(&self, from: UserId, to: UserId) -> Result<(), RelationError> {
        self.request_ledger
            .pop_pending(PendingFilter::Pair(UserPair::new(from, to)))
            .await?;

        debug!(%from, %to, "friend request withdrawn");
        Ok(())
    }

    async fn remove_friend(&self, user: UserId, friend: UserId) -> Result<(), RelationError> {
        self.friendship_ledger
            .pop_by_pair(UserPair::new(user, friend))
            .await?;

        info!(%user, %friend, "unfriended");
        Ok(())
    }

    async fn get_requests(&self, user: UserId) -> Result<Vec<FriendRequest>, RelationError> {
        self.request_ledger.list_for_user(user).await
    }

    async fn sweep_expired(&self, user: UserId) -> Result<SweepReport, RelationError> {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        for friendship in self.friendship_ledger.list_for_user(user).await? {
            if !friendship.is_expired(now) {
                continue;
            }
            // `None`: someone else removed it first
            if let Some(removed) = self
                .friendship_ledger
                .pop_by_id(friendship.pair, friendship.id)
                .await?
            {
                if let Some(other) = removed.pair.other(user) {
                    report.removed.push(other);
                }
            }
        }

        if !report.is_empty() {
            info!(%user, removed = report.removed.len(), "expired friendships swept");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::*;
    use chrono::{TimeDelta, Utc};

    struct Fixture {
        service: RealRelationshipService,
        friendships: Arc<MemoryFriendshipLedger>,
        clock: Arc<ManualClock>,
    }

    fn fixture(policy: RelationshipPolicy) -> Fixture {
        let friendships = Arc::new(MemoryFriendshipLedger::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = RealRelationshipService::new(
            Arc::new(MemoryRequestLedger::new()),
            friendships.clone(),
            clock.clone(),
            policy,
        );
        Fixture {
            service,
            friendships,
            clock,
        }
    }

    fn user(n: u128) -> UserId {
        UserId(uuid::Uuid::from_u128(n))
    }

    fn millis(n: i64) -> Validity {
        Validity::from_millis(n).unwrap()
    }

    #[tokio::test]
    async fn self_request_is_a_validation_error() {
        let f = fixture(RelationshipPolicy::default());
        let err = f.service.send_request(user(1), user(1), millis(10)).await.unwrap_err();
        assert_eq!(err.kind(), RelationErrorKind::Validation);
    }

    #[tokio::test]
    async fn duration_above_policy_is_refused() {
        let f = fixture(RelationshipPolicy {
            max_duration: millis(1000),
            sweep_on_read: true,
        });
        let err = f.service.send_request(user(1), user(2), millis(1001)).await.unwrap_err();
        assert!(matches!(err, RelationError::InvalidDuration(_)));
        f.service.send_request(user(1), user(2), millis(1000)).await.unwrap();
    }

    #[tokio::test]
    async fn sender_cannot_accept_own_request() {
        let f = fixture(RelationshipPolicy::default());
        f.service.send_request(user(1), user(2), millis(1000)).await.unwrap();

        let err = f.service.accept_request(user(2), user(1)).await.unwrap_err();
        assert_eq!(err.kind(), RelationErrorKind::Forbidden);
        let err = f.service.reject_request(user(2), user(1)).await.unwrap_err();
        assert_eq!(err.kind(), RelationErrorKind::Forbidden);

        // the request survived both attempts
        f.service.accept_request(user(1), user(2)).await.unwrap();
    }

    #[tokio::test]
    async fn accepted_friendship_carries_requested_duration() {
        let f = fixture(RelationshipPolicy::default());
        f.service.send_request(user(1), user(2), millis(5000)).await.unwrap();
        f.clock.advance(TimeDelta::milliseconds(300));

        let friendship = f.service.accept_request(user(1), user(2)).await.unwrap();
        assert_eq!(friendship.duration, millis(5000));
        assert_eq!(friendship.created_on, f.clock.now());

        let history = f.service.get_requests(user(2)).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, RequestStatus::Accepted);
    }

    #[tokio::test]
    async fn expired_edge_does_not_block_a_new_request() {
        let f = fixture(RelationshipPolicy::default());
        f.friendships
            .insert(Friendship::new(
                UserPair::new(user(1), user(2)),
                f.clock.now() - TimeDelta::milliseconds(2000),
                millis(1000),
            ))
            .unwrap();

        f.service.send_request(user(2), user(1), millis(1000)).await.unwrap();
        assert!(f.friendships.list_for_user(user(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_friends_hides_expired_edges_without_sweeping() {
        let f = fixture(RelationshipPolicy {
            sweep_on_read: false,
            ..RelationshipPolicy::default()
        });
        f.service.send_request(user(1), user(2), millis(1000)).await.unwrap();
        f.service.accept_request(user(1), user(2)).await.unwrap();
        f.clock.advance(TimeDelta::milliseconds(1000));

        assert!(f.service.get_friends(user(1)).await.unwrap().is_empty());
        // still stored until a sweep runs
        assert_eq!(f.friendships.list_for_user(user(1)).await.unwrap().len(), 1);

        let report = f.service.sweep_expired(user(2)).await.unwrap();
        assert_eq!(report.removed, vec![user(1)]);
    }

    #[tokio::test]
    async fn sweep_keeps_live_friendships() {
        let f = fixture(RelationshipPolicy::default());
        for (other, duration) in [(2, 1000), (3, 60_000)] {
            f.service.send_request(user(1), user(other), millis(duration)).await.unwrap();
            f.service.accept_request(user(1), user(other)).await.unwrap();
        }
        f.clock.advance(TimeDelta::milliseconds(1500));

        let report = f.service.sweep_expired(user(1)).await.unwrap();
        assert_eq!(report.removed, vec![user(2)]);
        assert_eq!(f.service.get_friends(user(1)).await.unwrap(), vec![user(3)]);

        let again = f.service.sweep_expired(user(1)).await.unwrap();
        assert!(again.is_empty());
    }
}
