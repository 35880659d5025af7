//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    NewUserRecord, ProfileChanges, StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{EmailAddress, PasswordHash, User, UserExtraFields, UserId, UserName};

use super::diesel_helpers::{is_unique_violation, map_basic_diesel_error, map_pool_error_message};
use super::models::{NewUserRow, UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

diesel::define_sql_function! {
    /// SQL `lower(text)`.
    fn lower(value: Text) -> Text;
}

/// Unique index enforcing case-insensitive email uniqueness.
const EMAIL_UNIQUE_INDEX: &str = "users_email_lower_key";

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_user(row: &UserRow) -> Result<User, UserPersistenceError> {
    let email = EmailAddress::parse(&row.email)
        .map_err(|err| UserPersistenceError::query(format!("user {}: {err}", row.id)))?;
    let name = UserName::new(&row.name)
        .map_err(|err| UserPersistenceError::query(format!("user {}: {err}", row.id)))?;
    let extra = UserExtraFields {
        name,
        is_active: row.is_active,
        is_staff: row.is_staff,
        is_superuser: row.is_superuser,
    };
    Ok(User::new(UserId::new(row.id), email, extra))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            email: record.email.as_ref(),
            name: record.extra.name.as_ref(),
            password_hash: record.password_hash.as_ref(),
            is_active: record.extra.is_active,
            is_staff: record.extra.is_staff,
            is_superuser: record.extra.is_superuser,
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err, EMAIL_UNIQUE_INDEX) {
                    UserPersistenceError::duplicate_email(record.email.as_ref())
                } else {
                    map_diesel_error(err)
                }
            })?;

        row_to_user(&row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_i64())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(lower(users::email).eq(email.lookup_key()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            Ok(StoredCredentials {
                user: row_to_user(&row)?,
                password_hash: PasswordHash::from_stored(row.password_hash),
            })
        })
        .transpose()
    }

    async fn update_profile(
        &self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        if changes.name.is_none() && changes.password_hash.is_none() {
            return self.find_by_id(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = UserProfileChangeset {
            name: changes.name.as_ref().map(AsRef::as_ref),
            password_hash: changes.password_hash.as_ref().map(AsRef::as_ref),
        };

        let row: Option<UserRow> = diesel::update(users::table.find(id.as_i64()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref().map(row_to_user).transpose()
    }
}
