use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub uuid::Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(UserId)
    }
}

/// Unordered pair of users, stored with the smaller id first so that
/// `{a, b}` and `{b, a}` share one key.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct UserPair(UserId, UserId);

impl UserPair {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a < b { Self(a, b) } else { Self(b, a) }
    }

    pub fn min(&self) -> UserId {
        self.0
    }

    pub fn max(&self) -> UserId {
        self.1
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.0 == user || self.1 == user
    }

    /// The member of the pair that is not `me`, or `None` if `me` is not in it.
    pub fn other(&self, me: UserId) -> Option<UserId> {
        if self.0 == me {
            Some(self.1)
        } else if self.1 == me {
            Some(self.0)
        } else {
            None
        }
    }
}

impl fmt::Display for UserPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: u128) -> UserId {
        UserId(uuid::Uuid::from_u128(n))
    }

    #[test]
    fn pair_is_direction_independent() {
        assert_eq!(UserPair::new(user(1), user(2)), UserPair::new(user(2), user(1)));
        assert_eq!(UserPair::new(user(2), user(1)).min(), user(1));
    }

    #[test]
    fn other_side_is_matched_by_value() {
        let pair = UserPair::new(user(7), user(3));
        assert_eq!(pair.other(user(3)), Some(user(7)));
        assert_eq!(pair.other(user(7)), Some(user(3)));
        assert_eq!(pair.other(user(9)), None);
        assert!(!pair.contains(user(9)));
    }
}
