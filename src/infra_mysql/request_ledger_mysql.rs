use super::util::{decode_validity, is_dup_key};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

const SELECT_REQUEST: &str = r#"
SELECT request_id, from_user, to_user, status, duration_ms, requested_at
FROM friend_request
"#;

pub struct MySqlRequestLedger {
    pool: MySqlPool,
}

impl MySqlRequestLedger {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, request: &FriendRequest) -> Result<(), sqlx::Error> {
        let pair = request.pair();
        sqlx::query(
            r#"
INSERT INTO friend_request
    (request_id, from_user, to_user, user_min, user_max, status, duration_ms, requested_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(request.id)
        .bind(request.from)
        .bind(request.to)
        .bind(pair.min())
        .bind(pair.max())
        .bind(request.status.as_str())
        .bind(request.duration.map(|d| d.as_millis()))
        .bind(request.requested_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn request_from_row(row: &MySqlRow) -> Result<FriendRequest, RelationError> {
    let decode = |column: &str, e: sqlx::Error| RelationError::Store(format!("decode {column}: {e}"));

    let status = row
        .try_get::<String, _>("status")
        .map_err(|e| decode("status", e))?
        .parse::<RequestStatus>()
        .map_err(RelationError::Store)?;
    let duration = row
        .try_get::<Option<i64>, _>("duration_ms")
        .map_err(|e| decode("duration_ms", e))?
        .map(decode_validity)
        .transpose()?;

    Ok(FriendRequest {
        id: row
            .try_get::<RequestId, _>("request_id")
            .map_err(|e| decode("request_id", e))?,
        from: row
            .try_get::<UserId, _>("from_user")
            .map_err(|e| decode("from_user", e))?,
        to: row
            .try_get::<UserId, _>("to_user")
            .map_err(|e| decode("to_user", e))?,
        status,
        duration,
        requested_at: row
            .try_get::<DateTime<Utc>, _>("requested_at")
            .map_err(|e| decode("requested_at", e))?,
    })
}

#[async_trait::async_trait]
impl RequestLedger for MySqlRequestLedger {
    async fn create(
        &self,
        from: UserId,
        to: UserId,
        duration: Validity,
        requested_at: DateTime<Utc>,
    ) -> Result<FriendRequest, RelationError> {
        let request = FriendRequest::pending(from, to, duration, requested_at);
        match self.insert(&request).await {
            Ok(()) => Ok(request),
            Err(e) if is_dup_key(&e) => Err(RelationError::RequestAlreadyExists),
            Err(e) => Err(RelationError::Store(format!("insert friend request: {e}"))),
        }
    }

    async fn record(&self, request: &FriendRequest) -> Result<(), RelationError> {
        if request.is_pending() {
            return Err(RelationError::Store(format!(
                "audit record {} must be resolved",
                request.id
            )));
        }
        self.insert(request)
            .await
            .map_err(|e| RelationError::Store(format!("insert request audit: {e}")))
    }

    async fn pop_pending(&self, filter: PendingFilter) -> Result<FriendRequest, RelationError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RelationError::Store(format!("begin pop request: {e}")))?;

        let select = match filter {
            PendingFilter::Directed { .. } => {
                format!("{SELECT_REQUEST} WHERE status = 'pending' AND from_user = ? AND to_user = ? FOR UPDATE")
            }
            PendingFilter::Pair(_) => {
                format!("{SELECT_REQUEST} WHERE status = 'pending' AND user_min = ? AND user_max = ? FOR UPDATE")
            }
        };
        let query = match filter {
            PendingFilter::Directed { from, to } => sqlx::query(&select).bind(from).bind(to),
            PendingFilter::Pair(pair) => sqlx::query(&select).bind(pair.min()).bind(pair.max()),
        };

        let row = query
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RelationError::Store(format!("select pending request: {e}")))?
            .ok_or(RelationError::RequestNotFound)?;
        let request = request_from_row(&row)?;

        sqlx::query("DELETE FROM friend_request WHERE request_id = ?")
            .bind(request.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RelationError::Store(format!("delete pending request: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(format!("commit pop request: {e}")))?;

        Ok(request)
    }

    async fn find_pending(&self, pair: UserPair) -> Result<Option<FriendRequest>, RelationError> {
        let row = sqlx::query(&format!(
            "{SELECT_REQUEST} WHERE status = 'pending' AND user_min = ? AND user_max = ?"
        ))
        .bind(pair.min())
        .bind(pair.max())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("select pending request: {e}")))?;

        row.as_ref().map(request_from_row).transpose()
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<FriendRequest>, RelationError> {
        let rows = sqlx::query(&format!(
            "{SELECT_REQUEST} WHERE from_user = ? OR to_user = ? ORDER BY requested_at, request_id"
        ))
        .bind(user)
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("list friend requests: {e}")))?;

        rows.iter().map(request_from_row).collect()
    }
}
