//! Game entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the games table.
#[derive(Debug, Clone, FromRow)]
pub struct GameEntity {
    pub id: i64,
    pub team_id: i64,
    pub season_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub description: String,
}

impl From<GameEntity> for domain::models::Game {
    fn from(entity: GameEntity) -> Self {
        Self {
            id: entity.id,
            team_id: entity.team_id,
            season_id: entity.season_id,
            starts_at: entity.starts_at,
            description: entity.description,
        }
    }
}
