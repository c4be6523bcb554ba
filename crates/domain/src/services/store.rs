//! Storage seams for the reminder engine.
//!
//! The persistence crate implements these against PostgreSQL. Every write is
//! expected to be an atomic upsert so that the batch job and the web process
//! can run concurrently without application-level locking.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::DomainError;
use crate::models::{DueReminder, Game, Player, RosterMembership, RsvpRecord, RsvpStatus, Team, Token};

pub type StoreResult<T> = Result<T, DomainError>;

/// Per-(player, game) attendance state.
#[async_trait]
pub trait RsvpStore: Send + Sync {
    /// Returns the existing record or inserts a fresh `NoReply` one.
    async fn get_or_create(&self, player_id: i64, game_id: i64) -> StoreResult<RsvpRecord>;

    async fn find(&self, player_id: i64, game_id: i64) -> StoreResult<Option<RsvpRecord>>;

    /// Last write wins. Never touches `reminder_sent`.
    async fn set_status(
        &self,
        player_id: i64,
        game_id: i64,
        status: RsvpStatus,
    ) -> StoreResult<RsvpRecord>;

    /// Sets `reminder_sent` for every pair in one write. Never touches `status`.
    /// Returns the number of distinct pairs written.
    async fn mark_reminders_sent(&self, pairs: &[(i64, i64)]) -> StoreResult<u64>;

    /// Roster rows whose team's nearest upcoming game starts within `within` of
    /// `now` and whose record is unsent or unanswered. Ordered by team then player.
    async fn find_due(&self, now: DateTime<Utc>, within: Duration) -> StoreResult<Vec<DueReminder>>;

    /// Upcoming games the player was reminded about on teams with SMS reminders
    /// enabled, nearest game per team.
    async fn pending_sms_games(&self, player_id: i64, now: DateTime<Utc>) -> StoreResult<Vec<Game>>;
}

/// Hashed token records.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, token: &Token) -> StoreResult<()>;

    async fn find(&self, token_hash: &str) -> StoreResult<Option<Token>>;

    /// Returns true if a row was removed.
    async fn delete(&self, token_hash: &str) -> StoreResult<bool>;

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// Read access to players, owned by the player-management layer.
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Player>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Player>>;

    async fn find_by_phone(&self, phone: i64) -> StoreResult<Option<Player>>;
}

/// Roster, team and schedule access, owned by the CRUD layer.
#[async_trait]
pub trait RosterDirectory: Send + Sync {
    /// All roster rows ordered by (team_id, player_id).
    async fn memberships(&self) -> StoreResult<Vec<RosterMembership>>;

    async fn membership(&self, player_id: i64, team_id: i64) -> StoreResult<Option<RosterMembership>>;

    async fn team(&self, team_id: i64) -> StoreResult<Option<Team>>;

    async fn game(&self, game_id: i64) -> StoreResult<Option<Game>>;

    /// The team's nearest game starting after `now` and within `within`.
    async fn next_game_for_team(
        &self,
        team_id: i64,
        now: DateTime<Utc>,
        within: Duration,
    ) -> StoreResult<Option<Game>>;

    /// Returns false when the player is not on the team.
    async fn set_remind_sms(&self, player_id: i64, team_id: i64, enabled: bool) -> StoreResult<bool>;
}
