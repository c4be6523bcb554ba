//! Translation of database errors into the domain taxonomy.

use domain::DomainError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

const RSVP_PLAYER_FK: &str = "rsvp_records_player_id_fkey";

/// Maps a database error for general reads and writes.
pub fn map_db_error(err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::RowNotFound => DomainError::NotFound("Resource not found".into()),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => DomainError::Conflict("Resource already exists".into()),
            Some(FOREIGN_KEY_VIOLATION) => {
                DomainError::NotFound("Referenced resource not found".into())
            }
            Some(CHECK_VIOLATION) => DomainError::InvalidArgument(db_err.message().to_string()),
            _ => DomainError::Internal(format!("Database error: {}", db_err)),
        },
        other => DomainError::Internal(format!("Database error: {}", other)),
    }
}

/// Maps a database error from a status write.
///
/// An unknown player means the change has no resolved identity.
pub fn map_status_write_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        let is_fk = db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION);
        if is_fk && db_err.constraint() == Some(RSVP_PLAYER_FK) {
            return DomainError::Unauthorized("unknown player".into());
        }
        if is_fk {
            return DomainError::NotFound("game not found".into());
        }
    }
    map_db_error(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = map_db_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_pool_errors_are_internal() {
        assert!(matches!(
            map_db_error(sqlx::Error::PoolTimedOut),
            DomainError::Internal(_)
        ));
        assert!(matches!(
            map_status_write_error(sqlx::Error::PoolClosed),
            DomainError::Internal(_)
        ));
    }
}
