//! Reminder link seam.

use crate::models::{Game, RsvpStatus};

/// Builds the absolute URL a reminder link points at.
///
/// The routing layer owns the path template; callers supply the token and
/// the status the link should set.
pub trait ReminderLinks: Send + Sync {
    fn rsvp_url(&self, game: &Game, token: &str, status: RsvpStatus) -> String;
}
