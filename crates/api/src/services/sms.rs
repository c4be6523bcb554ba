//! SMS dispatcher backed by a Twilio-compatible messaging gateway.

use std::time::Duration;

use async_trait::async_trait;
use chrono::FixedOffset;
use domain::models::{Game, Player};
use domain::services::{Channel, ChannelError, ReminderChannel, ReminderMessage};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SmsConfig;

/// Form fields posted to `{api_base}/Accounts/{sid}/Messages.json`.
#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    #[serde(rename = "To")]
    to: String,
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "Body")]
    body: String,
    #[serde(rename = "StatusCallback", skip_serializing_if = "Option::is_none")]
    status_callback: Option<&'a str>,
}

/// Client for the outbound SMS gateway.
#[derive(Clone)]
pub struct SmsGatewayClient {
    client: Client,
    config: SmsConfig,
    display_offset: FixedOffset,
}

impl SmsGatewayClient {
    pub fn new(config: SmsConfig, display_offset: FixedOffset) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            display_offset,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    pub fn render_body(&self, game: &Game) -> String {
        format!(
            "Game Reminder:\n{} {}\nReply\nYES/NO/MAYBE/STOP",
            game.display_time(self.display_offset),
            game.description
        )
    }

    /// Sends one text to the player. Players without a phone fail without a
    /// network call.
    pub async fn send_text(&self, player: &Player, body: String) -> Result<(), ChannelError> {
        if !self.config.enabled {
            return Err(ChannelError::Disabled);
        }

        let to = player
            .sms_address()
            .ok_or(ChannelError::MissingAddress(player.id))?;

        let form = OutboundMessage {
            to,
            from: &self.config.from_number,
            body,
            status_callback: self.config.status_callback_url.as_deref(),
        };

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(player_id = player.id, status = %status, "SMS gateway accepted message");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(
                player_id = player.id,
                status = %status,
                error = %body,
                "SMS gateway rejected message"
            );
            Err(ChannelError::Rejected(format!("{status}: {body}")))
        }
    }
}

#[async_trait]
impl ReminderChannel for SmsGatewayClient {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    async fn send_reminder(&self, reminder: &ReminderMessage) -> Result<(), ChannelError> {
        let body = self.render_body(&reminder.game);
        self.send_text(&reminder.player, body).await?;

        info!(
            player_id = reminder.player.id,
            game_id = reminder.game.id,
            team_id = reminder.team.id,
            "Reminder SMS sent"
        );
        Ok(())
    }
}
