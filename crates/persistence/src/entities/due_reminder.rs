//! Due reminder row (roster x next game x player join).

use chrono::{DateTime, Utc};
use domain::models::{DueReminder, Game, Player, RosterMembership};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct DueReminderEntity {
    pub player_id: i64,
    pub player_name: String,
    pub player_email: String,
    pub player_phone: Option<i64>,
    pub game_id: i64,
    pub team_id: i64,
    pub season_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub description: String,
    pub is_manager: bool,
    pub remind_email: bool,
    pub remind_sms: bool,
}

impl From<DueReminderEntity> for DueReminder {
    fn from(row: DueReminderEntity) -> Self {
        Self {
            player: Player {
                id: row.player_id,
                name: row.player_name,
                email: row.player_email,
                phone: row.player_phone,
            },
            game: Game {
                id: row.game_id,
                team_id: row.team_id,
                season_id: row.season_id,
                starts_at: row.starts_at,
                description: row.description,
            },
            membership: RosterMembership {
                player_id: row.player_id,
                team_id: row.team_id,
                is_manager: row.is_manager,
                remind_email: row.remind_email,
                remind_sms: row.remind_sms,
            },
        }
    }
}
