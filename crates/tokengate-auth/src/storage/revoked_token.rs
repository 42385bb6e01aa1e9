//! Revoked refresh token storage.
//!
//! Refresh tokens enter this set when they are consumed by rotation, revoked
//! by logout, or presented by the wrong subject. Entries are never removed.
//!
//! Tokens are keyed by their SHA-256 digest, so the set never holds a usable
//! credential.

use async_trait::async_trait;
use dashmap::DashSet;
use sha2::{Digest, Sha256};

use crate::AuthResult;

/// Storage trait for revoked refresh tokens.
///
/// # Consistency
///
/// Once `revoke(t)` has returned, every later `is_revoked(t)` from any task
/// must return `true`.
#[async_trait]
pub trait RevokedTokenStorage: Send + Sync {
    /// Marks a token as revoked.
    ///
    /// Idempotent. Returns `true` only for the call that actually inserted
    /// the entry, so concurrent callers can use it to consume a token
    /// exactly once.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke(&self, token: &str) -> AuthResult<bool>;

    /// Checks whether a token has been revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn is_revoked(&self, token: &str) -> AuthResult<bool>;

    /// Number of revoked tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn len(&self) -> AuthResult<usize>;
}

/// Hashes a token for storage.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Process-local revocation set.
///
/// Backed by a sharded [`DashSet`]; insert and lookup for the same key take
/// the same shard lock, which makes them linearizable.
#[derive(Debug, Default)]
pub struct InMemoryRevokedTokenStorage {
    revoked: DashSet<String>,
}

impl InMemoryRevokedTokenStorage {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevokedTokenStorage for InMemoryRevokedTokenStorage {
    async fn revoke(&self, token: &str) -> AuthResult<bool> {
        Ok(self.revoked.insert(hash_token(token)))
    }

    async fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        Ok(self.revoked.contains(&hash_token(token)))
    }

    async fn len(&self) -> AuthResult<usize> {
        Ok(self.revoked.len())
    }
}
