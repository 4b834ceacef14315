use crate::application_port::RelationError;
use crate::domain_model::Validity;
use sqlx::mysql::MySqlDatabaseError;

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == 1062; // ER_DUP_ENTRY
        }
    }

    false
}

pub fn decode_validity(millis: i64) -> Result<Validity, RelationError> {
    Validity::from_millis(millis)
        .map_err(|e| RelationError::Store(format!("decode duration_ms: {e}")))
}
