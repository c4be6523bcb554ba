//! Repository for player lookups.

use async_trait::async_trait;
use domain::models::Player;
use domain::services::{PlayerDirectory, StoreResult};
use sqlx::PgPool;

use crate::entities::PlayerEntity;
use crate::error::map_db_error;
use crate::metrics::QueryTimer;

/// Repository for player operations.
#[derive(Clone)]
pub struct PlayerRepository {
    pool: PgPool,
}

impl PlayerRepository {
    /// Creates a new player repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerDirectory for PlayerRepository {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Player>> {
        let timer = QueryTimer::new("find_player_by_id");
        let result = sqlx::query_as::<_, PlayerEntity>(
            r#"
            SELECT id, name, email, phone
            FROM players
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(map_db_error)?.map(Player::from))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Player>> {
        let timer = QueryTimer::new("find_player_by_email");
        let result = sqlx::query_as::<_, PlayerEntity>(
            r#"
            SELECT id, name, email, phone
            FROM players
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(map_db_error)?.map(Player::from))
    }

    async fn find_by_phone(&self, phone: i64) -> StoreResult<Option<Player>> {
        let timer = QueryTimer::new("find_player_by_phone");
        let result = sqlx::query_as::<_, PlayerEntity>(
            r#"
            SELECT id, name, email, phone
            FROM players
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(map_db_error)?.map(Player::from))
    }
}
