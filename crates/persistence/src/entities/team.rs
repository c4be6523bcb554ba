//! Team entity (database row mapping).

use sqlx::FromRow;

/// Database row mapping for the teams table.
#[derive(Debug, Clone, FromRow)]
pub struct TeamEntity {
    pub id: i64,
    pub name: String,
    pub division_id: Option<i64>,
}

impl From<TeamEntity> for domain::models::Team {
    fn from(entity: TeamEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            division_id: entity.division_id,
        }
    }
}
