//! Domain models for the reminder engine.

pub mod entity;
pub mod game;
pub mod player;
pub mod reminder;
pub mod roster;
pub mod rsvp;
pub mod team;
pub mod token;

pub use entity::RouteEntity;
pub use game::Game;
pub use player::Player;
pub use reminder::{DueReminder, ReminderReport, TeamReminderStatus};
pub use roster::RosterMembership;
pub use rsvp::{RsvpRecord, RsvpStatus};
pub use team::Team;
pub use token::{IssuedToken, Token, TokenPurpose};
