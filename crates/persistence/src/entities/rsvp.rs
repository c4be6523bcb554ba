//! RSVP record entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{RsvpRecord, RsvpStatus};
use domain::DomainError;
use sqlx::FromRow;

/// Database row mapping for the rsvp_records table.
#[derive(Debug, Clone, FromRow)]
pub struct RsvpRecordEntity {
    pub player_id: i64,
    pub game_id: i64,
    pub status: String,
    pub reminder_sent: bool,
    pub reminded_at: Option<DateTime<Utc>>,
}

impl TryFrom<RsvpRecordEntity> for RsvpRecord {
    type Error = DomainError;

    fn try_from(entity: RsvpRecordEntity) -> Result<Self, Self::Error> {
        let status = RsvpStatus::from_code(&entity.status).map_err(|_| {
            DomainError::Internal(format!("corrupt rsvp status {:?}", entity.status))
        })?;
        Ok(Self {
            player_id: entity.player_id,
            game_id: entity.game_id,
            status,
            reminder_sent: entity.reminder_sent,
            reminded_at: entity.reminded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(status: &str) -> RsvpRecordEntity {
        RsvpRecordEntity {
            player_id: 1,
            game_id: 2,
            status: status.to_string(),
            reminder_sent: true,
            reminded_at: None,
        }
    }

    #[test]
    fn test_converts_codes() {
        let record = RsvpRecord::try_from(entity("M")).unwrap();
        assert_eq!(record.status, RsvpStatus::Maybe);
        assert!(record.reminder_sent);
    }

    #[test]
    fn test_corrupt_status_is_internal() {
        let err = RsvpRecord::try_from(entity("Z")).unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
