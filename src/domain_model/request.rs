use crate::domain_model::{UserId, UserPair, Validity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct RequestId(pub uuid::Uuid);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FriendRequest {
    pub id: RequestId,
    pub from: UserId,
    pub to: UserId,
    pub status: RequestStatus,
    /// Present while pending and on the `accepted` audit record.
    pub duration: Option<Validity>,
    pub requested_at: DateTime<Utc>,
}

impl FriendRequest {
    pub fn pending(
        from: UserId,
        to: UserId,
        duration: Validity,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RequestId(uuid::Uuid::new_v4()),
            from,
            to,
            status: RequestStatus::Pending,
            duration: Some(duration),
            requested_at,
        }
    }

    /// Terminal audit record for a request that has just been popped.
    pub fn resolved(&self, status: RequestStatus, at: DateTime<Utc>) -> Self {
        let duration = match status {
            RequestStatus::Rejected => None,
            _ => self.duration,
        };
        Self {
            id: RequestId(uuid::Uuid::new_v4()),
            from: self.from,
            to: self.to,
            status,
            duration,
            requested_at: at,
        }
    }

    pub fn pair(&self) -> UserPair {
        UserPair::new(self.from, self.to)
    }

    pub fn involves(&self, user: UserId) -> bool {
        self.from == user || self.to == user
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
