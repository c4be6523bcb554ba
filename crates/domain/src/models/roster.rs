//! Roster membership (player x team) model.

use serde::{Deserialize, Serialize};

/// Per-(player, team) settings: manager flag and per-channel reminder opt-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterMembership {
    pub player_id: i64,
    pub team_id: i64,
    pub is_manager: bool,
    pub remind_email: bool,
    pub remind_sms: bool,
}

impl RosterMembership {
    pub fn wants_reminders(&self) -> bool {
        self.remind_email || self.remind_sms
    }
}
