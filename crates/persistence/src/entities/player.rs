//! Player entity (database row mapping).

use sqlx::FromRow;

/// Database row mapping for the players table.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerEntity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<i64>,
}

impl From<PlayerEntity> for domain::models::Player {
    fn from(entity: PlayerEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
        }
    }
}
