//! In-memory user and token stores.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{
    AuthTokenPersistenceError, AuthTokenRepository, NewUserRecord, ProfileChanges,
    StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{EmailAddress, PasswordHash, TokenDigest, User, UserExtraFields, UserId};

use super::{Sequence, lock};

#[derive(Debug, Clone)]
struct UserEntry {
    user: User,
    password_hash: PasswordHash,
}

#[derive(Debug, Default)]
struct UserTable {
    ids: Sequence,
    rows: Vec<UserEntry>,
}

/// [`UserRepository`] over a `Vec` of accounts.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Mutex<UserTable>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let mut table = lock(&self.table, UserPersistenceError::query)?;
        let key = record.email.lookup_key();
        if table
            .rows
            .iter()
            .any(|entry| entry.user.email().lookup_key() == key)
        {
            return Err(UserPersistenceError::duplicate_email(record.email.as_ref()));
        }
        let id = UserId::new(table.ids.next());
        let user = User::new(id, record.email.clone(), record.extra.clone());
        table.rows.push(UserEntry {
            user: user.clone(),
            password_hash: record.password_hash.clone(),
        });
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let table = lock(&self.table, UserPersistenceError::query)?;
        Ok(table
            .rows
            .iter()
            .find(|entry| entry.user.id() == id)
            .map(|entry| entry.user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let table = lock(&self.table, UserPersistenceError::query)?;
        let key = email.lookup_key();
        Ok(table
            .rows
            .iter()
            .find(|entry| entry.user.email().lookup_key() == key)
            .map(|entry| StoredCredentials {
                user: entry.user.clone(),
                password_hash: entry.password_hash.clone(),
            }))
    }

    async fn update_profile(
        &self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut table = lock(&self.table, UserPersistenceError::query)?;
        let Some(entry) = table.rows.iter_mut().find(|entry| entry.user.id() == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            let extra = UserExtraFields {
                name: name.clone(),
                is_active: entry.user.is_active(),
                is_staff: entry.user.is_staff(),
                is_superuser: entry.user.is_superuser(),
            };
            entry.user = User::new(entry.user.id(), entry.user.email().clone(), extra);
        }
        if let Some(hash) = &changes.password_hash {
            entry.password_hash = hash.clone();
        }
        Ok(Some(entry.user.clone()))
    }
}

/// [`AuthTokenRepository`] keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryAuthTokenRepository {
    digests: Mutex<HashMap<UserId, TokenDigest>>,
}

impl InMemoryAuthTokenRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthTokenRepository for InMemoryAuthTokenRepository {
    async fn replace_for_user(
        &self,
        user_id: UserId,
        digest: &TokenDigest,
    ) -> Result<(), AuthTokenPersistenceError> {
        let mut digests = lock(&self.digests, AuthTokenPersistenceError::query)?;
        digests.insert(user_id, digest.clone());
        Ok(())
    }

    async fn find_user(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserId>, AuthTokenPersistenceError> {
        let digests = lock(&self.digests, AuthTokenPersistenceError::query)?;
        Ok(digests
            .iter()
            .find(|(_, stored)| *stored == digest)
            .map(|(user_id, _)| *user_id))
    }
}
