//! Driving port for account and token use-cases.
//!
//! Inbound adapters call [`UserAccounts`] to register users, exchange
//! credentials for tokens and resolve tokens back to the acting user without
//! knowing which stores back them.

use async_trait::async_trait;

use crate::domain::{
    AuthToken, Error, LoginCredentials, Password, User, UserExtraFields, UserName,
};

/// Changes accepted by `PATCH /user/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<UserName>,
    /// New password, hashed before storage.
    pub password: Option<Password>,
}

/// Account use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// Register a user. An empty `email` is rejected; a `None` password
    /// leaves the account unable to log in by password.
    async fn create_user(
        &self,
        email: &str,
        password: Option<Password>,
        extra: UserExtraFields,
    ) -> Result<User, Error>;

    /// Register a user with the staff and superuser flags set.
    async fn create_superuser(&self, email: &str, password: Password) -> Result<User, Error>;

    /// The active user matching these credentials, if any.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Option<User>, Error>;

    /// Exchange credentials for a fresh token, replacing the user's previous
    /// one. Bad credentials yield a validation error under
    /// `non_field_errors`.
    async fn issue_token(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error>;

    /// The active owner of `token`, or an unauthorized error.
    async fn resolve_token(&self, token: &AuthToken) -> Result<User, Error>;

    /// Apply a profile update for `user`.
    async fn update_profile(&self, user: &User, update: ProfileUpdate) -> Result<User, Error>;
}
