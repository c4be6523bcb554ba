//! Reminder batch models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Game, Player, RosterMembership};

/// A roster row whose team's next game is due for a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueReminder {
    pub player: Player,
    pub game: Game,
    pub membership: RosterMembership,
}

/// Outcome of one batch pass for one team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamReminderStatus {
    pub message: String,
    pub game_id: Option<i64>,
    pub email_sent: u32,
    pub email_failed: u32,
    pub sms_sent: u32,
    pub sms_failed: u32,
    pub skipped: u32,
}

impl TeamReminderStatus {
    pub const NO_UPCOMING_GAME: &'static str = "No upcoming unreminded games";

    pub fn no_upcoming_game() -> Self {
        Self {
            message: Self::NO_UPCOMING_GAME.to_string(),
            ..Default::default()
        }
    }

    /// Status line for a team that had a game: `"{description} - email: n, sms: m"`.
    pub fn summarize(&mut self, game: &Game) {
        self.game_id = Some(game.id);
        self.message = format!(
            "{} - email: {}, sms: {}",
            game.description, self.email_sent, self.sms_sent
        );
    }
}

/// Per-team summary of a reminder batch, keyed by `Team::report_key`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderReport {
    pub teams: BTreeMap<String, TeamReminderStatus>,
    pub marked: u64,
}

impl ReminderReport {
    pub fn total_sent(&self) -> u32 {
        self.teams
            .values()
            .map(|t| t.email_sent + t.sms_sent)
            .sum()
    }

    pub fn total_failed(&self) -> u32 {
        self.teams
            .values()
            .map(|t| t.email_failed + t.sms_failed)
            .sum()
    }
}
