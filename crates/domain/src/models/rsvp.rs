//! RSVP status and record models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A player's attendance response for one game.
///
/// Persisted as a single character code: `?`, `Y`, `N` or `M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RsvpStatus {
    #[default]
    NoReply,
    Yes,
    No,
    Maybe,
}

impl RsvpStatus {
    pub const ALL: [RsvpStatus; 4] = [
        RsvpStatus::NoReply,
        RsvpStatus::Yes,
        RsvpStatus::No,
        RsvpStatus::Maybe,
    ];

    /// The persisted single-character code.
    pub fn code(&self) -> char {
        match self {
            RsvpStatus::NoReply => '?',
            RsvpStatus::Yes => 'Y',
            RsvpStatus::No => 'N',
            RsvpStatus::Maybe => 'M',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::NoReply => "?",
            RsvpStatus::Yes => "Y",
            RsvpStatus::No => "N",
            RsvpStatus::Maybe => "M",
        }
    }

    /// Parses a persisted code or a long name, case-insensitively.
    pub fn from_code(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "?" | "NOREPLY" | "NO_REPLY" => Ok(RsvpStatus::NoReply),
            "Y" | "YES" => Ok(RsvpStatus::Yes),
            "N" | "NO" => Ok(RsvpStatus::No),
            "M" | "MAYBE" => Ok(RsvpStatus::Maybe),
            _ => Err(DomainError::InvalidArgument(format!(
                "invalid rsvp status: {value:?}"
            ))),
        }
    }

    pub fn is_reply(&self) -> bool {
        *self != RsvpStatus::NoReply
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RsvpStatus::from_code(s)
    }
}

impl Serialize for RsvpStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RsvpStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RsvpStatus::from_code(&raw).map_err(serde::de::Error::custom)
    }
}

/// Per-(player, game) attendance record. At most one exists per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRecord {
    pub player_id: i64,
    pub game_id: i64,
    pub status: RsvpStatus,
    pub reminder_sent: bool,
    pub reminded_at: Option<DateTime<Utc>>,
}

impl RsvpRecord {
    /// A fresh record: no reply, no reminder sent.
    pub fn new(player_id: i64, game_id: i64) -> Self {
        Self {
            player_id,
            game_id,
            status: RsvpStatus::NoReply,
            reminder_sent: false,
            reminded_at: None,
        }
    }

    /// A reminder goes out once, and never after the player has replied.
    pub fn needs_reminder(&self) -> bool {
        !self.reminder_sent && !self.status.is_reply()
    }
}

/// Validates the target of a status write before it reaches a store.
///
/// A missing player means no resolved identity, so it is reported as
/// `Unauthorized` rather than `InvalidArgument`.
pub fn check_status_target(player_id: i64, game_id: i64) -> Result<(), DomainError> {
    if player_id <= 0 {
        return Err(DomainError::Unauthorized(
            "no player for status change".to_string(),
        ));
    }
    if game_id <= 0 {
        return Err(DomainError::InvalidArgument("game is required".to_string()));
    }
    Ok(())
}
