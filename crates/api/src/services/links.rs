//! Reminder link builder backed by the public route table.

use domain::models::{Game, RouteEntity, RsvpStatus};
use domain::services::ReminderLinks;

/// Query parameter carrying the reminder token.
pub const TOKEN_PARAM: &str = "token";

/// Builds `{base_url}/game/{id}/show?token=..&status=..`.
#[derive(Debug, Clone)]
pub struct RouteLinks {
    base_url: String,
}

impl RouteLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl ReminderLinks for RouteLinks {
    fn rsvp_url(&self, game: &Game, token: &str, status: RsvpStatus) -> String {
        let path = RouteEntity::Game(game.clone()).path("show");
        format!(
            "{}{}?{}={}&status={}",
            self.base_url,
            path,
            TOKEN_PARAM,
            token,
            status.code()
        )
    }
}
