//! Inbound SMS reply handling.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::models::{Game, Player, RsvpStatus};
use domain::services::sms::replies;
use domain::services::{RosterDirectory, RsvpStore, SmsCommand};
use domain::DomainError;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::identity::{Credential, IdentityResolver};
use crate::middleware::metrics::record_inbound_sms;

/// Webhook form body. Gateways send many more fields; only these are read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundSms {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

#[derive(Clone)]
pub struct InboundSmsHandler {
    identity: IdentityResolver,
    rsvps: Arc<dyn RsvpStore>,
    roster: Arc<dyn RosterDirectory>,
}

impl InboundSmsHandler {
    pub fn new(
        identity: IdentityResolver,
        rsvps: Arc<dyn RsvpStore>,
        roster: Arc<dyn RosterDirectory>,
    ) -> Self {
        Self {
            identity,
            rsvps,
            roster,
        }
    }

    /// Always produces a reply; the carrier cannot act on an error status.
    pub async fn handle(&self, sms: &InboundSms) -> &'static str {
        self.handle_at(sms, Utc::now()).await
    }

    pub async fn handle_at(&self, sms: &InboundSms, now: DateTime<Utc>) -> &'static str {
        let player = match self
            .identity
            .resolve(&Credential::Phone(sms.from.clone()))
            .await
        {
            Ok(player) => player,
            Err(DomainError::InvalidArgument(_) | DomainError::NotFound(_)) => {
                info!("Inbound SMS from unknown number");
                return replies::UNKNOWN_NUMBER;
            }
            Err(e) => {
                error!(error = %e, "Failed to resolve inbound SMS sender");
                return replies::INTERNAL_ERROR;
            }
        };

        let command = SmsCommand::parse(&sms.body);
        record_inbound_sms(command);
        if command == SmsCommand::Unrecognized {
            return replies::UNKNOWN_REPLY;
        }

        let game = match self.rsvps.pending_sms_games(player.id, now).await {
            Ok(games) => match games.as_slice() {
                [] => return replies::NO_PENDING_GAME,
                [game] => game.clone(),
                _ => {
                    warn!(
                        player_id = player.id,
                        candidates = games.len(),
                        "SMS reply matches games on several teams, not applying"
                    );
                    return replies::AMBIGUOUS_TEAM;
                }
            },
            Err(e) => {
                error!(player_id = player.id, error = %e, "Failed to load pending games");
                return replies::INTERNAL_ERROR;
            }
        };

        match self.apply(&player, &game, command).await {
            Ok(reply) => {
                info!(
                    player_id = player.id,
                    game_id = game.id,
                    team_id = game.team_id,
                    ?command,
                    "Applied SMS reply"
                );
                reply
            }
            Err(e) => {
                error!(player_id = player.id, game_id = game.id, error = %e, "Failed to apply SMS reply");
                replies::INTERNAL_ERROR
            }
        }
    }

    async fn apply(
        &self,
        player: &Player,
        game: &Game,
        command: SmsCommand,
    ) -> Result<&'static str, DomainError> {
        match command {
            SmsCommand::Yes => {
                self.rsvps
                    .set_status(player.id, game.id, RsvpStatus::Yes)
                    .await?;
                Ok(replies::YES)
            }
            SmsCommand::No => {
                self.rsvps
                    .set_status(player.id, game.id, RsvpStatus::No)
                    .await?;
                Ok(replies::NO)
            }
            SmsCommand::Stop => {
                if !self
                    .roster
                    .set_remind_sms(player.id, game.team_id, false)
                    .await?
                {
                    return Err(DomainError::NotFound("roster membership".into()));
                }
                Ok(replies::STOP)
            }
            SmsCommand::Unrecognized => Ok(replies::UNKNOWN_REPLY),
        }
    }
}
