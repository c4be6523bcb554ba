//! RSVP and reminder delivery API.
//!
//! Library half of the `rsvp` binary, exposed so integration tests can build
//! the router over in-memory stores.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod services;
