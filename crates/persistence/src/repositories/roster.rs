//! Repository for rosters, teams and the game schedule.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use domain::models::{Game, RosterMembership, Team};
use domain::services::{RosterDirectory, StoreResult};
use sqlx::PgPool;

use crate::entities::{GameEntity, RosterMembershipEntity, TeamEntity};
use crate::error::map_db_error;
use crate::metrics::QueryTimer;

/// Repository for roster and schedule reads.
#[derive(Clone)]
pub struct RosterRepository {
    pool: PgPool,
}

impl RosterRepository {
    /// Creates a new roster repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RosterDirectory for RosterRepository {
    async fn memberships(&self) -> StoreResult<Vec<RosterMembership>> {
        let timer = QueryTimer::new("list_roster_memberships");
        let result = sqlx::query_as::<_, RosterMembershipEntity>(
            r#"
            SELECT player_id, team_id, is_manager, remind_email, remind_sms
            FROM roster_memberships
            ORDER BY team_id, player_id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result
            .map_err(map_db_error)?
            .into_iter()
            .map(RosterMembership::from)
            .collect())
    }

    async fn membership(
        &self,
        player_id: i64,
        team_id: i64,
    ) -> StoreResult<Option<RosterMembership>> {
        let timer = QueryTimer::new("find_roster_membership");
        let result = sqlx::query_as::<_, RosterMembershipEntity>(
            r#"
            SELECT player_id, team_id, is_manager, remind_email, remind_sms
            FROM roster_memberships
            WHERE player_id = $1 AND team_id = $2
            "#,
        )
        .bind(player_id)
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(map_db_error)?.map(RosterMembership::from))
    }

    async fn team(&self, team_id: i64) -> StoreResult<Option<Team>> {
        let timer = QueryTimer::new("find_team_by_id");
        let result = sqlx::query_as::<_, TeamEntity>(
            r#"
            SELECT id, name, division_id
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(map_db_error)?.map(Team::from))
    }

    async fn game(&self, game_id: i64) -> StoreResult<Option<Game>> {
        let timer = QueryTimer::new("find_game_by_id");
        let result = sqlx::query_as::<_, GameEntity>(
            r#"
            SELECT id, team_id, season_id, starts_at, description
            FROM games
            WHERE id = $1
            "#,
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(map_db_error)?.map(Game::from))
    }

    async fn next_game_for_team(
        &self,
        team_id: i64,
        now: DateTime<Utc>,
        within: Duration,
    ) -> StoreResult<Option<Game>> {
        let timer = QueryTimer::new("find_next_game_for_team");
        let result = sqlx::query_as::<_, GameEntity>(
            r#"
            SELECT id, team_id, season_id, starts_at, description
            FROM games
            WHERE team_id = $1 AND starts_at > $2 AND starts_at <= $3
            ORDER BY starts_at, id
            LIMIT 1
            "#,
        )
        .bind(team_id)
        .bind(now)
        .bind(now + within)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(map_db_error)?.map(Game::from))
    }

    async fn set_remind_sms(
        &self,
        player_id: i64,
        team_id: i64,
        enabled: bool,
    ) -> StoreResult<bool> {
        let timer = QueryTimer::new("update_roster_remind_sms");
        let result = sqlx::query(
            r#"
            UPDATE roster_memberships
            SET remind_sms = $3
            WHERE player_id = $1 AND team_id = $2
            "#,
        )
        .bind(player_id)
        .bind(team_id)
        .bind(enabled)
        .execute(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(map_db_error)?.rows_affected() > 0)
    }
}
