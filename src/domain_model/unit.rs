use crate::application_port::RelationError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::fmt;

/// Validity window of a friendship, in milliseconds. Always positive.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize)]
pub struct Validity(i64);

impl Validity {
    pub const ONE_YEAR: Validity = Validity(365 * 24 * 60 * 60 * 1000);

    pub fn from_millis(millis: i64) -> Result<Self, RelationError> {
        if millis <= 0 {
            return Err(RelationError::InvalidDuration(format!(
                "duration must be positive, got {millis}ms"
            )));
        }
        Ok(Self(millis))
    }

    pub fn from_secs(secs: u64) -> Result<Self, RelationError> {
        let millis = i64::try_from(secs)
            .ok()
            .and_then(|s| s.checked_mul(1000))
            .ok_or_else(|| RelationError::InvalidDuration(format!("{secs}s is out of range")))?;
        Self::from_millis(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// `start + self`, saturating at the latest representable instant.
    pub fn end_from(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        TimeDelta::try_milliseconds(self.0)
            .and_then(|delta| start.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_durations() {
        assert!(matches!(
            Validity::from_millis(0),
            Err(RelationError::InvalidDuration(_))
        ));
        assert!(Validity::from_millis(-5).is_err());
        assert_eq!(Validity::from_secs(2).unwrap().as_millis(), 2000);
    }

    #[test]
    fn end_saturates_instead_of_overflowing() {
        let start = Utc::now();
        let end = Validity::from_millis(i64::MAX).unwrap().end_from(start);
        assert_eq!(end, DateTime::<Utc>::MAX_UTC);
    }
}
