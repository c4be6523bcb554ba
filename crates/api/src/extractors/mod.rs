//! Custom Axum extractors.

pub mod identity;

pub use identity::{client_ip, IdentitySource, PlayerIdentity};
