//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, PasswordHash, User, UserExtraFields, UserId, UserName};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this email, ignoring case.
        DuplicateEmail { email: String } => "user with email {email} already exists",
    }
}

/// Row to insert for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Normalised email.
    pub email: EmailAddress,
    /// Hash or unusable marker.
    pub password_hash: PasswordHash,
    /// Name and flags.
    pub extra: UserExtraFields,
}

/// A user together with the stored password hash, for credential checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// The account.
    pub user: User,
    /// Hash to verify against.
    pub password_hash: PasswordHash,
}

/// Profile columns to overwrite; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    /// New display name.
    pub name: Option<UserName>,
    /// New password hash.
    pub password_hash: Option<PasswordHash>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, failing with
    /// [`UserPersistenceError::DuplicateEmail`] when the email is taken.
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and password hash by email, comparing case-insensitively.
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Apply profile changes and return the updated user.
    async fn update_profile(
        &self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, UserPersistenceError>;
}
