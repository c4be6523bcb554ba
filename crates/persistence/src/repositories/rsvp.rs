//! Repository for per-(player, game) RSVP records.
//!
//! Every write is a single `INSERT .. ON CONFLICT` statement so concurrent
//! reminder batches and inbound replies never race on row creation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use domain::models::rsvp::check_status_target;
use domain::models::{DueReminder, Game, RsvpRecord, RsvpStatus};
use domain::services::{RsvpStore, StoreResult};
use sqlx::PgPool;

use crate::entities::{DueReminderEntity, GameEntity, RsvpRecordEntity};
use crate::error::{map_db_error, map_status_write_error};
use crate::metrics::QueryTimer;

/// Repository for RSVP operations.
#[derive(Clone)]
pub struct RsvpRepository {
    pool: PgPool,
}

impl RsvpRepository {
    /// Creates a new RSVP repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn mark_sent_in_transaction(
        &self,
        player_ids: &[i64],
        game_ids: &[i64],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO rsvp_records (player_id, game_id, reminder_sent, reminded_at)
            SELECT t.player_id, t.game_id, TRUE, NOW()
            FROM UNNEST($1::BIGINT[], $2::BIGINT[]) AS t(player_id, game_id)
            ON CONFLICT (player_id, game_id) DO UPDATE
            SET reminder_sent = TRUE,
                reminded_at = COALESCE(rsvp_records.reminded_at, EXCLUDED.reminded_at)
            "#,
        )
        .bind(player_ids)
        .bind(game_ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}

/// Splits pairs into parallel arrays for `UNNEST`, dropping duplicates.
///
/// A single upsert may not touch the same row twice.
fn unnest_arrays(pairs: &[(i64, i64)]) -> (Vec<i64>, Vec<i64>) {
    let mut unique = pairs.to_vec();
    unique.sort_unstable();
    unique.dedup();
    unique.into_iter().unzip()
}

#[async_trait]
impl RsvpStore for RsvpRepository {
    async fn get_or_create(&self, player_id: i64, game_id: i64) -> StoreResult<RsvpRecord> {
        let timer = QueryTimer::new("get_or_create_rsvp");
        let result = sqlx::query_as::<_, RsvpRecordEntity>(
            r#"
            INSERT INTO rsvp_records (player_id, game_id)
            VALUES ($1, $2)
            ON CONFLICT (player_id, game_id) DO UPDATE
            SET player_id = rsvp_records.player_id
            RETURNING player_id, game_id, status, reminder_sent, reminded_at
            "#,
        )
        .bind(player_id)
        .bind(game_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result.map_err(map_db_error)?.try_into()
    }

    async fn find(&self, player_id: i64, game_id: i64) -> StoreResult<Option<RsvpRecord>> {
        let timer = QueryTimer::new("find_rsvp");
        let result = sqlx::query_as::<_, RsvpRecordEntity>(
            r#"
            SELECT player_id, game_id, status, reminder_sent, reminded_at
            FROM rsvp_records
            WHERE player_id = $1 AND game_id = $2
            "#,
        )
        .bind(player_id)
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
            .map_err(map_db_error)?
            .map(RsvpRecord::try_from)
            .transpose()
    }

    async fn set_status(
        &self,
        player_id: i64,
        game_id: i64,
        status: RsvpStatus,
    ) -> StoreResult<RsvpRecord> {
        check_status_target(player_id, game_id)?;

        let timer = QueryTimer::new("set_rsvp_status");
        let result = sqlx::query_as::<_, RsvpRecordEntity>(
            r#"
            INSERT INTO rsvp_records (player_id, game_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (player_id, game_id) DO UPDATE
            SET status = EXCLUDED.status,
                updated_at = NOW()
            RETURNING player_id, game_id, status, reminder_sent, reminded_at
            "#,
        )
        .bind(player_id)
        .bind(game_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result.map_err(map_status_write_error)?.try_into()
    }

    async fn mark_reminders_sent(&self, pairs: &[(i64, i64)]) -> StoreResult<u64> {
        if pairs.is_empty() {
            return Ok(0);
        }
        let (player_ids, game_ids) = unnest_arrays(pairs);

        let timer = QueryTimer::new("mark_reminders_sent");
        let result = self.mark_sent_in_transaction(&player_ids, &game_ids).await;
        timer.finish(&result);
        let marked = result.map_err(map_db_error)?;
        tracing::debug!(pairs = player_ids.len(), marked, "Marked reminders sent");
        Ok(marked)
    }

    async fn find_due(
        &self,
        now: DateTime<Utc>,
        within: Duration,
    ) -> StoreResult<Vec<DueReminder>> {
        let timer = QueryTimer::new("find_due_reminders");
        let result = sqlx::query_as::<_, DueReminderEntity>(
            r#"
            WITH next_games AS (
                SELECT DISTINCT ON (g.team_id)
                       g.id, g.team_id, g.season_id, g.starts_at, g.description
                FROM games g
                WHERE g.starts_at > $1
                ORDER BY g.team_id, g.starts_at, g.id
            )
            SELECT p.id AS player_id,
                   p.name AS player_name,
                   p.email AS player_email,
                   p.phone AS player_phone,
                   ng.id AS game_id,
                   ng.team_id,
                   ng.season_id,
                   ng.starts_at,
                   ng.description,
                   rm.is_manager,
                   rm.remind_email,
                   rm.remind_sms
            FROM roster_memberships rm
            JOIN next_games ng ON ng.team_id = rm.team_id
            JOIN players p ON p.id = rm.player_id
            LEFT JOIN rsvp_records r ON r.player_id = rm.player_id AND r.game_id = ng.id
            WHERE ng.starts_at <= $2
              AND (r.player_id IS NULL OR r.reminder_sent = FALSE OR r.status = '?')
            ORDER BY rm.team_id, rm.player_id
            "#,
        )
        .bind(now)
        .bind(now + within)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result
            .map_err(map_db_error)?
            .into_iter()
            .map(DueReminder::from)
            .collect())
    }

    async fn pending_sms_games(
        &self,
        player_id: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Game>> {
        let timer = QueryTimer::new("find_pending_sms_games");
        let result = sqlx::query_as::<_, GameEntity>(
            r#"
            SELECT DISTINCT ON (g.team_id)
                   g.id, g.team_id, g.season_id, g.starts_at, g.description
            FROM games g
            JOIN roster_memberships rm
              ON rm.team_id = g.team_id AND rm.player_id = $1 AND rm.remind_sms
            JOIN rsvp_records r
              ON r.game_id = g.id AND r.player_id = $1 AND r.reminder_sent
            WHERE g.starts_at > $2
            ORDER BY g.team_id, g.starts_at, g.id
            "#,
        )
        .bind(player_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);

        let mut games: Vec<Game> = result
            .map_err(map_db_error)?
            .into_iter()
            .map(Game::from)
            .collect();
        games.sort_by_key(|g| (g.starts_at, g.id));
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unnest_arrays_dedups_pairs() {
        let (players, games) = unnest_arrays(&[(2, 10), (1, 10), (2, 10), (1, 11)]);
        assert_eq!(players, vec![1, 1, 2]);
        assert_eq!(games, vec![10, 11, 10]);
    }

    #[test]
    fn test_unnest_arrays_empty() {
        let (players, games) = unnest_arrays(&[]);
        assert!(players.is_empty());
        assert!(games.is_empty());
    }
}
