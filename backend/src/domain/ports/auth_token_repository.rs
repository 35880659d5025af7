//! Port abstraction for API token storage.
use async_trait::async_trait;

use crate::domain::{TokenDigest, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by token repository adapters.
    pub enum AuthTokenPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token repository query failed: {message}",
    }
}

/// Stores one token digest per user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthTokenRepository: Send + Sync {
    /// Store `digest` as the user's only token, dropping any previous one.
    async fn replace_for_user(
        &self,
        user_id: UserId,
        digest: &TokenDigest,
    ) -> Result<(), AuthTokenPersistenceError>;

    /// Owner of the token with this digest, if any.
    async fn find_user(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserId>, AuthTokenPersistenceError>;
}
