use super::util::{decode_validity, is_dup_key};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

const SELECT_FRIENDSHIP: &str = r#"
SELECT friendship_id, user_min, user_max, created_on, duration_ms
FROM friendship
"#;

pub struct MySqlFriendshipLedger {
    pool: MySqlPool,
}

impl MySqlFriendshipLedger {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn friendship_from_row(row: &MySqlRow) -> Result<Friendship, RelationError> {
    let decode = |column: &str, e: sqlx::Error| RelationError::Store(format!("decode {column}: {e}"));

    let user_min = row
        .try_get::<UserId, _>("user_min")
        .map_err(|e| decode("user_min", e))?;
    let user_max = row
        .try_get::<UserId, _>("user_max")
        .map_err(|e| decode("user_max", e))?;
    let duration = row
        .try_get::<i64, _>("duration_ms")
        .map_err(|e| decode("duration_ms", e))?;

    Ok(Friendship {
        id: row
            .try_get::<FriendshipId, _>("friendship_id")
            .map_err(|e| decode("friendship_id", e))?,
        pair: UserPair::new(user_min, user_max),
        created_on: row
            .try_get::<DateTime<Utc>, _>("created_on")
            .map_err(|e| decode("created_on", e))?,
        duration: decode_validity(duration)?,
    })
}

#[async_trait::async_trait]
impl FriendshipLedger for MySqlFriendshipLedger {
    async fn create(
        &self,
        pair: UserPair,
        created_on: DateTime<Utc>,
        duration: Validity,
    ) -> Result<Friendship, RelationError> {
        let friendship = Friendship::new(pair, created_on, duration);

        let res = sqlx::query(
            r#"
INSERT INTO friendship (friendship_id, user_min, user_max, created_on, duration_ms)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(friendship.id)
        .bind(pair.min())
        .bind(pair.max())
        .bind(created_on)
        .bind(duration.as_millis())
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(friendship),
            Err(e) if is_dup_key(&e) => Err(RelationError::AlreadyFriends),
            Err(e) => Err(RelationError::Store(format!("insert friendship: {e}"))),
        }
    }

    async fn pop_by_pair(&self, pair: UserPair) -> Result<Friendship, RelationError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RelationError::Store(format!("begin pop friendship: {e}")))?;

        let row = sqlx::query(&format!(
            "{SELECT_FRIENDSHIP} WHERE user_min = ? AND user_max = ? FOR UPDATE"
        ))
        .bind(pair.min())
        .bind(pair.max())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RelationError::Store(format!("select friendship: {e}")))?
        .ok_or(RelationError::FriendNotFound)?;
        let friendship = friendship_from_row(&row)?;

        sqlx::query("DELETE FROM friendship WHERE friendship_id = ?")
            .bind(friendship.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RelationError::Store(format!("delete friendship: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(format!("commit pop friendship: {e}")))?;

        Ok(friendship)
    }

    async fn pop_by_id(
        &self,
        pair: UserPair,
        id: FriendshipId,
    ) -> Result<Option<Friendship>, RelationError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RelationError::Store(format!("begin pop friendship: {e}")))?;

        let Some(row) = sqlx::query(&format!(
            "{SELECT_FRIENDSHIP} WHERE friendship_id = ? AND user_min = ? AND user_max = ? FOR UPDATE"
        ))
        .bind(id)
        .bind(pair.min())
        .bind(pair.max())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RelationError::Store(format!("select friendship: {e}")))?
        else {
            return Ok(None);
        };
        let friendship = friendship_from_row(&row)?;

        sqlx::query("DELETE FROM friendship WHERE friendship_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RelationError::Store(format!("delete friendship: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(format!("commit pop friendship: {e}")))?;

        Ok(Some(friendship))
    }

    async fn find_by_pair(&self, pair: UserPair) -> Result<Option<Friendship>, RelationError> {
        let row = sqlx::query(&format!(
            "{SELECT_FRIENDSHIP} WHERE user_min = ? AND user_max = ?"
        ))
        .bind(pair.min())
        .bind(pair.max())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("select friendship: {e}")))?;

        row.as_ref().map(friendship_from_row).transpose()
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Friendship>, RelationError> {
        let rows = sqlx::query(&format!(
            "{SELECT_FRIENDSHIP} WHERE user_min = ? OR user_max = ? ORDER BY created_on"
        ))
        .bind(user)
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("list friendships: {e}")))?;

        rows.iter().map(friendship_from_row).collect()
    }
}
