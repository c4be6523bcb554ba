//! Cryptographic utilities for token generation and hashing.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Number of random bytes in a generated token (192 bits of entropy).
pub const TOKEN_RANDOM_BYTES: usize = 24;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates an opaque token from the OS random source, encoded with the
/// URL-safe base64 alphabet without padding.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_RANDOM_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Short, non-reversible fingerprint of a token for log correlation.
pub fn token_fingerprint(token: &str) -> String {
    sha256_hex(token)[..12].to_string()
}
