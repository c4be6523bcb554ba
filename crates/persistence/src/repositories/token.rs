//! Repository for hashed identity tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::Token;
use domain::services::{StoreResult, TokenStore};
use sqlx::PgPool;

use crate::entities::TokenEntity;
use crate::error::map_db_error;
use crate::metrics::QueryTimer;

/// Repository for token operations.
#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    /// Creates a new token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for TokenRepository {
    async fn insert(&self, token: &Token) -> StoreResult<()> {
        let timer = QueryTimer::new("insert_token");
        let result = sqlx::query(
            r#"
            INSERT INTO tokens (token_hash, player_id, purpose, ip, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&token.token_hash)
        .bind(token.player_id)
        .bind(token.purpose.as_str())
        .bind(token.ip.map(|ip| ip.to_string()))
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await;
        timer.finish(&result);
        result.map_err(map_db_error)?;
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> StoreResult<Option<Token>> {
        let timer = QueryTimer::new("find_token_by_hash");
        let result = sqlx::query_as::<_, TokenEntity>(
            r#"
            SELECT token_hash, player_id, purpose, ip, expires_at, created_at
            FROM tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result.map_err(map_db_error)?.map(Token::try_from).transpose()
    }

    async fn delete(&self, token_hash: &str) -> StoreResult<bool> {
        let timer = QueryTimer::new("delete_token");
        let result = sqlx::query("DELETE FROM tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result.map_err(map_db_error)?.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let timer = QueryTimer::new("delete_expired_tokens");
        let result = sqlx::query("DELETE FROM tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result.map_err(map_db_error)?.rows_affected())
    }
}
