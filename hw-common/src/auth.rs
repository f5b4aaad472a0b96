//! Credential and session-token helpers
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions. No HTTP framework
//! dependencies (Axum, etc.) - those live in hw-web.
//!
//! Password hashes are stored as `<salt_hex>$<sha256_hex>` where the
//! salt is 16 random bytes. This is the demo-grade scheme; hardening
//! (argon2, rate limits) is out of scope for this application.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_hex = hex_encode(&salt);
    let digest = salted_digest(&salt_hex, password);
    format!("{}${}", salt_hex, digest)
}

/// Verify a password against a stored `<salt_hex>$<sha256_hex>` hash
///
/// Returns false for malformed stored values rather than erroring:
/// a corrupt hash must never authenticate.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, expected)) = stored.split_once('$') else {
        return false;
    };
    salted_digest(salt_hex, password) == expected
}

/// Generate an opaque session token
pub fn new_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Compute a session expiry instant from a TTL in minutes
pub fn session_expiry(ttl_minutes: i64) -> DateTime<Utc> {
    Utc::now() + Duration::minutes(ttl_minutes)
}

fn salted_digest(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(b"$");
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        // Same password, different salt, different stored value
        assert_ne!(hash_password("hunter2"), hash_password("hunter2"));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("hunter2", "not-a-valid-hash"));
        assert!(!verify_password("hunter2", ""));
    }

    #[test]
    fn session_tokens_are_unique() {
        assert_ne!(new_session_token(), new_session_token());
    }
}
