//! Repository implementations for database operations.
//!
//! Each repository implements one of the domain store traits against PostgreSQL.

pub mod player;
pub mod roster;
pub mod rsvp;
pub mod token;

pub use player::PlayerRepository;
pub use roster::RosterRepository;
pub use rsvp::RsvpRepository;
pub use token::TokenRepository;
