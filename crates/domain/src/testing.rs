//! In-memory store implementations for tests.
//!
//! `MemoryStore` implements every store trait over one mutex-guarded state so
//! services can be exercised without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::DomainError;
use crate::models::{
    DueReminder, Game, Player, RosterMembership, RsvpRecord, RsvpStatus, Team, Token,
};
use crate::models::rsvp::check_status_target;
use crate::services::store::{
    PlayerDirectory, RosterDirectory, RsvpStore, StoreResult, TokenStore,
};

#[derive(Debug, Default)]
struct State {
    players: BTreeMap<i64, Player>,
    teams: BTreeMap<i64, Team>,
    games: BTreeMap<i64, Game>,
    memberships: BTreeMap<(i64, i64), RosterMembership>,
    rsvps: BTreeMap<(i64, i64), RsvpRecord>,
    tokens: HashMap<String, Token>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    roster_unavailable: AtomicBool,
    rsvps_unavailable_for_game: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| DomainError::Internal("memory store lock poisoned".to_string()))
    }

    /// Makes roster reads fail, for exercising batch-fatal errors.
    pub fn set_roster_unavailable(&self, unavailable: bool) {
        self.roster_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes RSVP reads for one game fail. Zero clears it.
    pub fn set_rsvps_unavailable_for_game(&self, game_id: i64) {
        self.rsvps_unavailable_for_game.store(game_id, Ordering::SeqCst);
    }

    pub fn add_player(&self, id: i64, name: &str, email: &str, phone: Option<i64>) -> Player {
        let player = Player {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone,
        };
        if let Ok(mut state) = self.state() {
            state.players.insert(id, player.clone());
        }
        player
    }

    pub fn add_team(&self, id: i64, name: &str, division_id: Option<i64>) -> Team {
        let team = Team {
            id,
            name: name.to_string(),
            division_id,
        };
        if let Ok(mut state) = self.state() {
            state.teams.insert(id, team.clone());
        }
        team
    }

    pub fn add_game(&self, id: i64, team_id: i64, starts_at: DateTime<Utc>, description: &str) -> Game {
        let game = Game {
            id,
            team_id,
            season_id: None,
            starts_at,
            description: description.to_string(),
        };
        if let Ok(mut state) = self.state() {
            state.games.insert(id, game.clone());
        }
        game
    }

    pub fn add_membership(
        &self,
        player_id: i64,
        team_id: i64,
        remind_email: bool,
        remind_sms: bool,
    ) -> RosterMembership {
        let membership = RosterMembership {
            player_id,
            team_id,
            is_manager: false,
            remind_email,
            remind_sms,
        };
        if let Ok(mut state) = self.state() {
            state.memberships.insert((team_id, player_id), membership);
        }
        membership
    }

    pub fn rsvp(&self, player_id: i64, game_id: i64) -> Option<RsvpRecord> {
        self.state()
            .ok()
            .and_then(|s| s.rsvps.get(&(player_id, game_id)).cloned())
    }

    pub fn rsvp_count(&self) -> usize {
        self.state().map(|s| s.rsvps.len()).unwrap_or(0)
    }

    pub fn token_count(&self) -> usize {
        self.state().map(|s| s.tokens.len()).unwrap_or(0)
    }

    fn next_game(state: &State, team_id: i64, now: DateTime<Utc>, within: Duration) -> Option<Game> {
        state
            .games
            .values()
            .filter(|g| g.team_id == team_id && g.is_within(now, within))
            .min_by_key(|g| (g.starts_at, g.id))
            .cloned()
    }
}

#[async_trait]
impl RsvpStore for MemoryStore {
    async fn get_or_create(&self, player_id: i64, game_id: i64) -> StoreResult<RsvpRecord> {
        if game_id != 0 && self.rsvps_unavailable_for_game.load(Ordering::SeqCst) == game_id {
            return Err(DomainError::Internal(format!("rsvps for game {game_id} unavailable")));
        }
        let mut state = self.state()?;
        let record = state
            .rsvps
            .entry((player_id, game_id))
            .or_insert_with(|| RsvpRecord::new(player_id, game_id));
        Ok(record.clone())
    }

    async fn find(&self, player_id: i64, game_id: i64) -> StoreResult<Option<RsvpRecord>> {
        Ok(self.state()?.rsvps.get(&(player_id, game_id)).cloned())
    }

    async fn set_status(
        &self,
        player_id: i64,
        game_id: i64,
        status: RsvpStatus,
    ) -> StoreResult<RsvpRecord> {
        check_status_target(player_id, game_id)?;
        let mut state = self.state()?;
        if !state.players.contains_key(&player_id) {
            return Err(DomainError::Unauthorized(format!("unknown player {player_id}")));
        }
        if !state.games.contains_key(&game_id) {
            return Err(DomainError::NotFound(format!("game {game_id}")));
        }
        let record = state
            .rsvps
            .entry((player_id, game_id))
            .or_insert_with(|| RsvpRecord::new(player_id, game_id));
        record.status = status;
        Ok(record.clone())
    }

    async fn mark_reminders_sent(&self, pairs: &[(i64, i64)]) -> StoreResult<u64> {
        let mut unique = pairs.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let now = Utc::now();
        let mut state = self.state()?;
        for (player_id, game_id) in &unique {
            let record = state
                .rsvps
                .entry((*player_id, *game_id))
                .or_insert_with(|| RsvpRecord::new(*player_id, *game_id));
            record.reminder_sent = true;
            record.reminded_at.get_or_insert(now);
        }
        Ok(unique.len() as u64)
    }

    async fn find_due(&self, now: DateTime<Utc>, within: Duration) -> StoreResult<Vec<DueReminder>> {
        let state = self.state()?;
        let mut due = Vec::new();
        for membership in state.memberships.values() {
            let Some(game) = Self::next_game(&state, membership.team_id, now, within) else {
                continue;
            };
            let Some(player) = state.players.get(&membership.player_id) else {
                continue;
            };
            let eligible = match state.rsvps.get(&(player.id, game.id)) {
                Some(record) => !record.reminder_sent || record.status == RsvpStatus::NoReply,
                None => true,
            };
            if eligible {
                due.push(DueReminder {
                    player: player.clone(),
                    game,
                    membership: *membership,
                });
            }
        }
        Ok(due)
    }

    async fn pending_sms_games(&self, player_id: i64, now: DateTime<Utc>) -> StoreResult<Vec<Game>> {
        let state = self.state()?;
        let mut games: Vec<Game> = state
            .memberships
            .values()
            .filter(|m| m.player_id == player_id && m.remind_sms)
            .filter_map(|m| {
                state
                    .games
                    .values()
                    .filter(|g| g.team_id == m.team_id && g.starts_at > now)
                    .filter(|g| {
                        state
                            .rsvps
                            .get(&(player_id, g.id))
                            .is_some_and(|r| r.reminder_sent)
                    })
                    .min_by_key(|g| (g.starts_at, g.id))
                    .cloned()
            })
            .collect();
        games.sort_by_key(|g| (g.starts_at, g.id));
        Ok(games)
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert(&self, token: &Token) -> StoreResult<()> {
        let mut state = self.state()?;
        if state.tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Conflict("token already exists".to_string()));
        }
        state.tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> StoreResult<Option<Token>> {
        Ok(self.state()?.tokens.get(token_hash).cloned())
    }

    async fn delete(&self, token_hash: &str) -> StoreResult<bool> {
        Ok(self.state()?.tokens.remove(token_hash).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut state = self.state()?;
        let before = state.tokens.len();
        state.tokens.retain(|_, t| !t.is_expired(now));
        Ok((before - state.tokens.len()) as u64)
    }
}

#[async_trait]
impl PlayerDirectory for MemoryStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Player>> {
        Ok(self.state()?.players.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Player>> {
        Ok(self
            .state()?
            .players
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_phone(&self, phone: i64) -> StoreResult<Option<Player>> {
        Ok(self
            .state()?
            .players
            .values()
            .find(|p| p.phone == Some(phone))
            .cloned())
    }
}

#[async_trait]
impl RosterDirectory for MemoryStore {
    async fn memberships(&self) -> StoreResult<Vec<RosterMembership>> {
        if self.roster_unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("roster unavailable".to_string()));
        }
        Ok(self.state()?.memberships.values().copied().collect())
    }

    async fn membership(&self, player_id: i64, team_id: i64) -> StoreResult<Option<RosterMembership>> {
        Ok(self.state()?.memberships.get(&(team_id, player_id)).copied())
    }

    async fn team(&self, team_id: i64) -> StoreResult<Option<Team>> {
        Ok(self.state()?.teams.get(&team_id).cloned())
    }

    async fn game(&self, game_id: i64) -> StoreResult<Option<Game>> {
        Ok(self.state()?.games.get(&game_id).cloned())
    }

    async fn next_game_for_team(
        &self,
        team_id: i64,
        now: DateTime<Utc>,
        within: Duration,
    ) -> StoreResult<Option<Game>> {
        Ok(Self::next_game(&*self.state()?, team_id, now, within))
    }

    async fn set_remind_sms(&self, player_id: i64, team_id: i64, enabled: bool) -> StoreResult<bool> {
        let mut state = self.state()?;
        match state.memberships.get_mut(&(team_id, player_id)) {
            Some(membership) => {
                membership.remind_sms = enabled;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (MemoryStore, DateTime<Utc>) {
        let now = Utc::now();
        let store = MemoryStore::new();
        store.add_player(1, "Sam", "sam@example.com", Some(5035550100));
        store.add_player(2, "Alex", "alex@example.com", None);
        store.add_team(10, "Owls", Some(1));
        store.add_game(100, 10, now + Duration::days(2), "Owls vs Hawks");
        store.add_game(101, 10, now + Duration::days(9), "Owls vs Crows");
        store.add_membership(2, 10, true, false);
        store.add_membership(1, 10, true, true);
        (store, now)
    }

    #[tokio::test]
    async fn test_set_status_last_write_wins() {
        let (store, _) = seeded();
        store.set_status(1, 100, RsvpStatus::Yes).await.unwrap();
        let record = store.set_status(1, 100, RsvpStatus::No).await.unwrap();

        assert_eq!(record.status, RsvpStatus::No);
        assert_eq!(store.rsvp_count(), 1);
    }

    #[tokio::test]
    async fn test_set_status_unknown_player_is_unauthorized() {
        let (store, _) = seeded();
        let err = store.set_status(99, 100, RsvpStatus::Yes).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_find_due_orders_by_team_then_player() {
        let (store, now) = seeded();
        let due = store.find_due(now, Duration::days(5)).await.unwrap();

        let ids: Vec<(i64, i64)> = due.iter().map(|d| (d.player.id, d.game.id)).collect();
        assert_eq!(ids, vec![(1, 100), (2, 100)]);
    }

    #[tokio::test]
    async fn test_mark_reminders_sent_keeps_status() {
        let (store, _) = seeded();
        store.set_status(1, 100, RsvpStatus::Maybe).await.unwrap();
        let marked = store
            .mark_reminders_sent(&[(1, 100), (1, 100), (2, 100)])
            .await
            .unwrap();

        assert_eq!(marked, 2);
        let record = store.rsvp(1, 100).unwrap();
        assert!(record.reminder_sent);
        assert_eq!(record.status, RsvpStatus::Maybe);
    }
}
