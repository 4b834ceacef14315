use crate::logger::*;
use anyhow::Result;
use sqlx::MySqlPool;

// `pending_pair` is only non-NULL while a request is pending, so the unique
// index allows any number of resolved records per pair but one pending one.
const CREATE_FRIEND_REQUEST: &str = r#"
CREATE TABLE IF NOT EXISTS friend_request (
    request_id   BINARY(16)    NOT NULL,
    from_user    BINARY(16)    NOT NULL,
    to_user      BINARY(16)    NOT NULL,
    user_min     BINARY(16)    NOT NULL,
    user_max     BINARY(16)    NOT NULL,
    status       VARCHAR(16)   NOT NULL,
    duration_ms  BIGINT        NULL,
    requested_at DATETIME(3)   NOT NULL,
    pending_pair VARBINARY(32) AS (IF(status = 'pending', CONCAT(user_min, user_max), NULL)) STORED,
    PRIMARY KEY (request_id),
    UNIQUE KEY uq_friend_request_pending (pending_pair),
    KEY idx_friend_request_from (from_user),
    KEY idx_friend_request_to (to_user)
)
"#;

const CREATE_FRIENDSHIP: &str = r#"
CREATE TABLE IF NOT EXISTS friendship (
    friendship_id BINARY(16)  NOT NULL,
    user_min      BINARY(16)  NOT NULL,
    user_max      BINARY(16)  NOT NULL,
    created_on    DATETIME(3) NOT NULL,
    duration_ms   BIGINT      NOT NULL,
    PRIMARY KEY (friendship_id),
    UNIQUE KEY uq_friendship_pair (user_min, user_max),
    KEY idx_friendship_user_max (user_max)
)
"#;

pub async fn ensure_schema(pool: &MySqlPool) -> Result<()> {
    for ddl in [CREATE_FRIEND_REQUEST, CREATE_FRIENDSHIP] {
        sqlx::query(ddl).execute(pool).await?;
    }
    info!("relationship schema ready");
    Ok(())
}
