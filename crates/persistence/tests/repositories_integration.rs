//! Repository tests against PostgreSQL.
//!
//! Set `TEST_DATABASE_URL` to run them; without it every test returns early.

use chrono::{Duration, Utc};
use domain::models::RsvpStatus;
use domain::services::{PlayerDirectory, RosterDirectory, RsvpStore, TokenStore};
use domain::DomainError;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use persistence::{PlayerRepository, RosterRepository, RsvpRepository, TokenRepository};
use rand::Rng;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");
    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

async fn insert_player(pool: &PgPool, phone: Option<i64>) -> i64 {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    let email = format!("{}-{}", rand::thread_rng().gen::<u32>(), email);
    sqlx::query_scalar("INSERT INTO players (name, email, phone) VALUES ($1, $2, $3) RETURNING id")
        .bind(name)
        .bind(email)
        .bind(phone)
        .fetch_one(pool)
        .await
        .expect("insert player")
}

async fn insert_team(pool: &PgPool) -> i64 {
    sqlx::query_scalar("INSERT INTO teams (name, division_id) VALUES ($1, 1) RETURNING id")
        .bind(format!("Team {}", rand::thread_rng().gen::<u32>()))
        .fetch_one(pool)
        .await
        .expect("insert team")
}

async fn insert_game(pool: &PgPool, team_id: i64, starts_in: Duration) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO games (team_id, starts_at, description) VALUES ($1, $2, 'Scrimmage') RETURNING id",
    )
    .bind(team_id)
    .bind(Utc::now() + starts_in)
    .fetch_one(pool)
    .await
    .expect("insert game")
}

async fn insert_membership(pool: &PgPool, player_id: i64, team_id: i64, email: bool, sms: bool) {
    sqlx::query(
        "INSERT INTO roster_memberships (player_id, team_id, remind_email, remind_sms) VALUES ($1, $2, $3, $4)",
    )
    .bind(player_id)
    .bind(team_id)
    .bind(email)
    .bind(sms)
    .execute(pool)
    .await
    .expect("insert membership");
}

fn random_phone() -> i64 {
    rand::thread_rng().gen_range(2_000_000_000..9_999_999_999)
}

#[tokio::test]
async fn test_set_status_is_last_write_wins() {
    let Some(pool) = test_pool().await else { return };
    let repo = RsvpRepository::new(pool.clone());
    let team = insert_team(&pool).await;
    let player = insert_player(&pool, None).await;
    let game = insert_game(&pool, team, Duration::days(2)).await;

    repo.set_status(player, game, RsvpStatus::Yes).await.unwrap();
    let record = repo.set_status(player, game, RsvpStatus::No).await.unwrap();
    assert_eq!(record.status, RsvpStatus::No);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM rsvp_records WHERE player_id = $1 AND game_id = $2",
    )
    .bind(player)
    .bind(game)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_set_status_unknown_player_is_unauthorized() {
    let Some(pool) = test_pool().await else { return };
    let repo = RsvpRepository::new(pool.clone());
    let team = insert_team(&pool).await;
    let game = insert_game(&pool, team, Duration::days(2)).await;

    let err = repo
        .set_status(i64::MAX - 1, game, RsvpStatus::Yes)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized(_)));
}

#[tokio::test]
async fn test_mark_reminders_sent_is_idempotent_and_keeps_status() {
    let Some(pool) = test_pool().await else { return };
    let repo = RsvpRepository::new(pool.clone());
    let team = insert_team(&pool).await;
    let player = insert_player(&pool, None).await;
    let other = insert_player(&pool, None).await;
    let game = insert_game(&pool, team, Duration::days(1)).await;

    repo.set_status(player, game, RsvpStatus::Maybe).await.unwrap();
    let batch = [(player, game), (other, game), (player, game)];
    repo.mark_reminders_sent(&batch).await.unwrap();
    repo.mark_reminders_sent(&batch).await.unwrap();

    let record = repo.find(player, game).await.unwrap().unwrap();
    assert!(record.reminder_sent);
    assert!(record.reminded_at.is_some());
    assert_eq!(record.status, RsvpStatus::Maybe);

    let created = repo.find(other, game).await.unwrap().unwrap();
    assert!(created.reminder_sent);
    assert_eq!(created.status, RsvpStatus::NoReply);
}

#[tokio::test]
async fn test_find_due_respects_window_and_replies() {
    let Some(pool) = test_pool().await else { return };
    let repo = RsvpRepository::new(pool.clone());
    let near_team = insert_team(&pool).await;
    let far_team = insert_team(&pool).await;
    let waiting = insert_player(&pool, None).await;
    let replied = insert_player(&pool, None).await;
    let far_player = insert_player(&pool, None).await;
    let near_game = insert_game(&pool, near_team, Duration::days(2)).await;
    insert_game(&pool, far_team, Duration::days(6)).await;
    insert_membership(&pool, waiting, near_team, true, false).await;
    insert_membership(&pool, replied, near_team, true, false).await;
    insert_membership(&pool, far_player, far_team, true, false).await;

    repo.set_status(replied, near_game, RsvpStatus::Yes).await.unwrap();
    repo.mark_reminders_sent(&[(replied, near_game)]).await.unwrap();

    let due = repo.find_due(Utc::now(), Duration::days(5)).await.unwrap();
    let ours: Vec<(i64, i64)> = due
        .iter()
        .filter(|d| d.game.team_id == near_team || d.game.team_id == far_team)
        .map(|d| (d.player.id, d.game.id))
        .collect();
    assert_eq!(ours, vec![(waiting, near_game)]);
}

#[tokio::test]
async fn test_pending_sms_games_and_stop() {
    let Some(pool) = test_pool().await else { return };
    let rsvps = RsvpRepository::new(pool.clone());
    let roster = RosterRepository::new(pool.clone());
    let players = PlayerRepository::new(pool.clone());
    let team = insert_team(&pool).await;
    let phone = random_phone();
    let player = insert_player(&pool, Some(phone)).await;
    let game = insert_game(&pool, team, Duration::days(1)).await;
    insert_membership(&pool, player, team, false, true).await;

    assert_eq!(players.find_by_phone(phone).await.unwrap().unwrap().id, player);
    assert!(rsvps.pending_sms_games(player, Utc::now()).await.unwrap().is_empty());

    rsvps.mark_reminders_sent(&[(player, game)]).await.unwrap();
    let pending = rsvps.pending_sms_games(player, Utc::now()).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, game);

    assert!(roster.set_remind_sms(player, team, false).await.unwrap());
    assert!(rsvps.pending_sms_games(player, Utc::now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_token_store_round_trip_and_purge() {
    let Some(pool) = test_pool().await else { return };
    let tokens = TokenRepository::new(pool.clone());
    let player = insert_player(&pool, None).await;
    let now = Utc::now();

    let live = domain::models::Token {
        token_hash: shared::crypto::sha256_hex(&shared::crypto::generate_token()),
        player_id: player,
        purpose: domain::models::TokenPurpose::Session,
        ip: Some("192.0.2.7".parse().unwrap()),
        expires_at: now + Duration::days(1),
        created_at: now,
    };
    let stale = domain::models::Token {
        token_hash: shared::crypto::sha256_hex(&shared::crypto::generate_token()),
        expires_at: now - Duration::days(1),
        ..live.clone()
    };
    tokens.insert(&live).await.unwrap();
    tokens.insert(&stale).await.unwrap();

    let err = tokens.insert(&live).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let found = tokens.find(&live.token_hash).await.unwrap().unwrap();
    assert_eq!(found.ip, live.ip);

    assert!(tokens.delete_expired(now).await.unwrap() >= 1);
    assert!(tokens.find(&stale.token_hash).await.unwrap().is_none());

    assert!(tokens.delete(&live.token_hash).await.unwrap());
    assert!(!tokens.delete(&live.token_hash).await.unwrap());
}
