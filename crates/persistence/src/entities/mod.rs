//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod due_reminder;
pub mod game;
pub mod player;
pub mod roster;
pub mod rsvp;
pub mod team;
pub mod token;

pub use due_reminder::DueReminderEntity;
pub use game::GameEntity;
pub use player::PlayerEntity;
pub use roster::RosterMembershipEntity;
pub use rsvp::RsvpRecordEntity;
pub use team::TeamEntity;
pub use token::TokenEntity;
