//! Reminder link target: records a player's reply for one game.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::rsvp::check_status_target;
use domain::models::{RsvpRecord, RsvpStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::PlayerIdentity;

#[derive(Debug, Default, Deserialize)]
pub struct ShowGameQuery {
    /// Status code from the link: `Y`, `N` or `M`. Absent means view only.
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RsvpResponse {
    pub game_id: i64,
    pub player_id: i64,
    pub status: RsvpStatus,
    pub reminder_sent: bool,
}

impl From<RsvpRecord> for RsvpResponse {
    fn from(record: RsvpRecord) -> Self {
        Self {
            game_id: record.game_id,
            player_id: record.player_id,
            status: record.status,
            reminder_sent: record.reminder_sent,
        }
    }
}

/// `GET /game/:game_id/show?token=..&status=..`
pub async fn show_game(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
    Query(query): Query<ShowGameQuery>,
    identity: PlayerIdentity,
) -> Result<Json<RsvpResponse>, ApiError> {
    let player_id = identity.player.id;
    check_status_target(player_id, game_id)?;

    let game = state
        .roster
        .game(game_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("game {game_id}")))?;

    if state
        .roster
        .membership(player_id, game.team_id)
        .await?
        .is_none()
    {
        return Err(ApiError::Unauthorized(
            "Player is not on this game's roster".to_string(),
        ));
    }

    let record = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(code) => {
            let status = RsvpStatus::from_code(code)?;
            let record = state.rsvps.set_status(player_id, game_id, status).await?;
            info!(
                player_id,
                game_id,
                status = status.as_str(),
                source = ?identity.source,
                "RSVP recorded"
            );
            record
        }
        None => state.rsvps.get_or_create(player_id, game_id).await?,
    };

    Ok(Json(record.into()))
}
