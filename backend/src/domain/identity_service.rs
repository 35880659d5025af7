//! Account, credential and token service.
//!
//! Implements [`UserAccounts`] over the user and token repositories and a
//! password hasher.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    AuthTokenPersistenceError, AuthTokenRepository, NewUserRecord, PasswordHasher,
    PasswordHasherError, ProfileChanges, ProfileUpdate, UserAccounts, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    AuthToken, EmailAddress, Error, LoginCredentials, NON_FIELD_ERRORS, Password, PasswordHash,
    User, UserExtraFields, UserValidationError,
};

/// Message returned for any credential failure at token issuance.
pub const BAD_CREDENTIALS_MESSAGE: &str = "Unable to authenticate with provided credentials";

/// Identity service implementing the account driving port.
pub struct IdentityService<U, T, H> {
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: Arc<H>,
}

impl<U, T, H> Clone for IdentityService<U, T, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            tokens: Arc::clone(&self.tokens),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<U, T, H> IdentityService<U, T, H> {
    /// Create a new service over the given adapters.
    pub fn new(users: Arc<U>, tokens: Arc<T>, hasher: Arc<H>) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::field("email", "user with this email already exists.")
        }
    }
}

fn map_token_error(error: AuthTokenPersistenceError) -> Error {
    match error {
        AuthTokenPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("token repository unavailable: {message}"))
        }
        AuthTokenPersistenceError::Query { message } => {
            Error::internal(format!("token repository error: {message}"))
        }
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

/// Field error for an email rejected by [`EmailAddress::parse`].
pub fn email_error(error: &UserValidationError) -> Error {
    match error {
        UserValidationError::EmptyEmail => Error::field("email", "Users must have an email address."),
        UserValidationError::EmailTooLong { max } => Error::field(
            "email",
            format!("Ensure this field has no more than {max} characters."),
        ),
        UserValidationError::InvalidEmail | UserValidationError::NameTooLong { .. } => {
            Error::field("email", "Enter a valid email address.")
        }
    }
}

impl<U, T, H> IdentityService<U, T, H>
where
    U: UserRepository,
    T: AuthTokenRepository,
    H: PasswordHasher,
{
    async fn register(
        &self,
        email: &str,
        password: Option<Password>,
        extra: UserExtraFields,
    ) -> Result<User, Error> {
        let email = EmailAddress::parse(email).map_err(|err| email_error(&err))?;
        let password_hash = match password {
            Some(password) => self.hasher.hash(&password).map_err(map_hasher_error)?,
            None => PasswordHash::unusable(),
        };
        let record = NewUserRecord {
            email,
            password_hash,
            extra,
        };
        let user = self.users.insert(&record).await.map_err(map_user_error)?;
        info!(
            user_id = %user.id(),
            is_staff = user.is_staff(),
            is_superuser = user.is_superuser(),
            "created user account"
        );
        Ok(user)
    }
}

#[async_trait]
impl<U, T, H> UserAccounts for IdentityService<U, T, H>
where
    U: UserRepository,
    T: AuthTokenRepository,
    H: PasswordHasher,
{
    async fn create_user(
        &self,
        email: &str,
        password: Option<Password>,
        extra: UserExtraFields,
    ) -> Result<User, Error> {
        self.register(email, password, extra).await
    }

    async fn create_superuser(&self, email: &str, password: Password) -> Result<User, Error> {
        let extra = UserExtraFields {
            is_staff: true,
            is_superuser: true,
            ..UserExtraFields::default()
        };
        self.register(email, Some(password), extra).await
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Option<User>, Error> {
        let Ok(email) = EmailAddress::parse(credentials.email()) else {
            return Ok(None);
        };
        let Some(stored) = self
            .users
            .find_credentials(&email)
            .await
            .map_err(map_user_error)?
        else {
            debug!("authentication failed: unknown email");
            return Ok(None);
        };
        if !stored.user.is_active() {
            debug!(user_id = %stored.user.id(), "authentication failed: inactive user");
            return Ok(None);
        }
        if !self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
        {
            debug!(user_id = %stored.user.id(), "authentication failed: password mismatch");
            return Ok(None);
        }
        Ok(Some(stored.user))
    }

    async fn issue_token(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error> {
        let Some(user) = self.authenticate(credentials).await? else {
            return Err(Error::field(NON_FIELD_ERRORS, BAD_CREDENTIALS_MESSAGE));
        };
        let token = AuthToken::generate();
        self.tokens
            .replace_for_user(user.id(), &token.digest())
            .await
            .map_err(map_token_error)?;
        info!(user_id = %user.id(), "issued API token");
        Ok(token)
    }

    async fn resolve_token(&self, token: &AuthToken) -> Result<User, Error> {
        let Some(user_id) = self
            .tokens
            .find_user(&token.digest())
            .await
            .map_err(map_token_error)?
        else {
            return Err(Error::unauthorized("Invalid token."));
        };
        match self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
        {
            Some(user) if user.is_active() => Ok(user),
            _ => Err(Error::unauthorized("User inactive or deleted.")),
        }
    }

    async fn update_profile(&self, user: &User, update: ProfileUpdate) -> Result<User, Error> {
        let password_hash = match update.password {
            Some(password) => Some(self.hasher.hash(&password).map_err(map_hasher_error)?),
            None => None,
        };
        let password_changed = password_hash.is_some();
        let changes = ProfileChanges {
            name: update.name,
            password_hash,
        };
        let updated = self
            .users
            .update_profile(user.id(), &changes)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        info!(user_id = %updated.id(), password_changed, "updated user profile");
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
