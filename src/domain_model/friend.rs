use crate::domain_model::{UserId, UserPair, Validity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct FriendshipId(pub uuid::Uuid);

impl fmt::Display for FriendshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An active friendship edge. Created by accepting a request, removed by
/// unfriending or by the expiry sweep, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Friendship {
    pub id: FriendshipId,
    pub pair: UserPair,
    pub created_on: DateTime<Utc>,
    pub duration: Validity,
}

impl Friendship {
    pub fn new(pair: UserPair, created_on: DateTime<Utc>, duration: Validity) -> Self {
        Self {
            id: FriendshipId(uuid::Uuid::new_v4()),
            pair,
            created_on,
            duration,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.duration.end_from(self.created_on)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// Outcome of one expiry sweep for a user.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// Users whose friendship with the swept user was removed.
    pub removed: Vec<UserId>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}
