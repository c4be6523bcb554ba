//! Roster membership entity (database row mapping).

use sqlx::FromRow;

/// Database row mapping for the roster_memberships table.
#[derive(Debug, Clone, FromRow)]
pub struct RosterMembershipEntity {
    pub player_id: i64,
    pub team_id: i64,
    pub is_manager: bool,
    pub remind_email: bool,
    pub remind_sms: bool,
}

impl From<RosterMembershipEntity> for domain::models::RosterMembership {
    fn from(entity: RosterMembershipEntity) -> Self {
        Self {
            player_id: entity.player_id,
            team_id: entity.team_id,
            is_manager: entity.is_manager,
            remind_email: entity.remind_email,
            remind_sms: entity.remind_sms,
        }
    }
}
