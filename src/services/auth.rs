//! Credential Verification
//!
//! Maps a bearer credential to a verified user identity. The real
//! credential issuer is an external collaborator; the seam here is the
//! `CredentialVerifier` trait, and the bundled implementation is a static
//! token table from the config file.

use std::collections::HashMap;

use taskline_core::{CoreError, CoreResult};

/// Verifies a bearer credential and yields the user identity it embeds
pub trait CredentialVerifier: Send + Sync {
    /// Returns the verified user id, or `Unauthenticated` when the
    /// credential is unknown or malformed
    fn verify(&self, bearer_token: &str) -> CoreResult<String>;
}

/// Token-table verifier backed by the config file.
///
/// Each configured token maps to exactly one user id. This stands in for
/// the external auth system; swapping in a real verifier only touches the
/// trait implementation.
pub struct TokenTableVerifier {
    tokens: HashMap<String, String>,
}

impl TokenTableVerifier {
    /// Build from a token -> user id table
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

impl CredentialVerifier for TokenTableVerifier {
    fn verify(&self, bearer_token: &str) -> CoreResult<String> {
        let token = bearer_token.trim();
        if token.is_empty() {
            return Err(CoreError::unauthenticated("empty bearer token"));
        }
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| CoreError::unauthenticated("unknown bearer token"))
    }
}
