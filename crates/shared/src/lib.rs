//! Shared utilities used across the reminder engine crates.
//!
//! - Cryptographic helpers (token generation, hashing)
//! - Phone number normalization

pub mod crypto;
pub mod phone;
