//! Outbound reminder channels.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Game, Player, Team};

/// Delivery channel for a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a channel needs to render one reminder.
#[derive(Debug, Clone)]
pub struct ReminderMessage {
    pub player: Player,
    pub game: Game,
    pub team: Team,
    /// Reminder token for status links. Only set for channels that carry links.
    pub token: Option<String>,
}

/// Per-message delivery failure. Never fatal to a batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel disabled")]
    Disabled,

    #[error("player {0} has no address for this channel")]
    MissingAddress(i64),

    #[error("failed to render message: {0}")]
    Render(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("gateway rejected message: {0}")]
    Rejected(String),
}

/// A channel dispatcher: renders and sends one reminder.
#[async_trait]
pub trait ReminderChannel: Send + Sync {
    fn channel(&self) -> Channel;

    /// False when sends would return `ChannelError::Disabled`. Checked before
    /// any per-message work such as issuing a reminder token.
    fn is_enabled(&self) -> bool {
        true
    }

    async fn send_reminder(&self, message: &ReminderMessage) -> Result<(), ChannelError>;
}

/// Records sends instead of delivering them.
///
/// Used for development and by tests to count dispatch attempts.
#[derive(Debug)]
pub struct MockReminderChannel {
    channel: Channel,
    enabled: bool,
    simulate_failure: bool,
    attempts: AtomicU32,
    sent: Mutex<Vec<(i64, i64)>>,
}

impl MockReminderChannel {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            enabled: true,
            simulate_failure: false,
            attempts: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// A channel whose every send fails with a transport error.
    pub fn failing(channel: Channel) -> Self {
        Self {
            simulate_failure: true,
            ..Self::new(channel)
        }
    }

    /// A channel that is switched off in configuration.
    pub fn disabled(channel: Channel) -> Self {
        Self {
            enabled: false,
            ..Self::new(channel)
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// (player_id, game_id) pairs that were delivered.
    pub fn sent(&self) -> Vec<(i64, i64)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReminderChannel for MockReminderChannel {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn send_reminder(&self, message: &ReminderMessage) -> Result<(), ChannelError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.enabled {
            return Err(ChannelError::Disabled);
        }

        if self.simulate_failure {
            tracing::warn!(
                channel = %self.channel,
                player_id = message.player.id,
                game_id = message.game.id,
                "Mock channel simulating failure"
            );
            return Err(ChannelError::Transport("Simulated failure".to_string()));
        }

        tracing::info!(
            channel = %self.channel,
            player_id = message.player.id,
            game_id = message.game.id,
            "Mock: Would send reminder"
        );

        if let Ok(mut sent) = self.sent.lock() {
            sent.push((message.player.id, message.game.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message() -> ReminderMessage {
        ReminderMessage {
            player: Player {
                id: 1,
                name: "Sam".to_string(),
                email: "sam@example.com".to_string(),
                phone: None,
            },
            game: Game {
                id: 2,
                team_id: 3,
                season_id: None,
                starts_at: Utc::now(),
                description: "Owls vs Hawks".to_string(),
            },
            team: Team {
                id: 3,
                name: "Owls".to_string(),
                division_id: None,
            },
            token: None,
        }
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(Channel::Email.to_string(), "email");
        assert_eq!(Channel::Sms.to_string(), "sms");
    }

    #[tokio::test]
    async fn test_mock_channel_records_sends() {
        let channel = MockReminderChannel::new(Channel::Email);
        channel.send_reminder(&message()).await.unwrap();

        assert_eq!(channel.attempts(), 1);
        assert_eq!(channel.sent(), vec![(1, 2)]);
    }

    #[tokio::test]
    async fn test_mock_channel_failure() {
        let channel = MockReminderChannel::failing(Channel::Sms);
        let result = channel.send_reminder(&message()).await;

        assert!(matches!(result, Err(ChannelError::Transport(_))));
        assert_eq!(channel.attempts(), 1);
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn test_mock_channel_disabled() {
        let channel = MockReminderChannel::disabled(Channel::Email);
        assert!(!channel.is_enabled());
        assert!(MockReminderChannel::new(Channel::Email).is_enabled());

        let result = channel.send_reminder(&message()).await;
        assert_eq!(result, Err(ChannelError::Disabled));
        assert!(channel.sent().is_empty());
    }
}
