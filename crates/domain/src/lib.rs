//! Domain layer for the RSVP and reminder engine.
//!
//! This crate contains:
//! - Domain models (Player, Team, Game, RosterMembership, RsvpRecord, Token)
//! - The store, channel and link traits the services are written against
//! - SMS reply parsing
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::DomainError;
