//! Domain services and seams for the reminder engine.
//!
//! Traits here are implemented by the persistence crate (stores) and the api
//! crate (channels, links).

pub mod channel;
pub mod links;
pub mod sms;
pub mod store;

pub use channel::{Channel, ChannelError, MockReminderChannel, ReminderChannel, ReminderMessage};
pub use links::ReminderLinks;
pub use sms::{command_code, SmsCommand};
pub use store::{PlayerDirectory, RosterDirectory, RsvpStore, StoreResult, TokenStore};
