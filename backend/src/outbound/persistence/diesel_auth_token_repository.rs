//! PostgreSQL-backed `AuthTokenRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AuthTokenPersistenceError, AuthTokenRepository};
use crate::domain::{TokenDigest, UserId};

use super::diesel_helpers::{map_basic_diesel_error, map_pool_error_message};
use super::models::NewAuthTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::auth_tokens;

/// Diesel-backed implementation of the [`AuthTokenRepository`] port.
#[derive(Clone)]
pub struct DieselAuthTokenRepository {
    pool: DbPool,
}

impl DieselAuthTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuthTokenPersistenceError {
    AuthTokenPersistenceError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> AuthTokenPersistenceError {
    map_basic_diesel_error(
        error,
        AuthTokenPersistenceError::query,
        AuthTokenPersistenceError::connection,
    )
}

#[async_trait]
impl AuthTokenRepository for DieselAuthTokenRepository {
    async fn replace_for_user(
        &self,
        user_id: UserId,
        digest: &TokenDigest,
    ) -> Result<(), AuthTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAuthTokenRow {
            user_id: user_id.as_i64(),
            digest: digest.as_ref(),
        };

        diesel::insert_into(auth_tokens::table)
            .values(&row)
            .on_conflict(auth_tokens::user_id)
            .do_update()
            .set(auth_tokens::digest.eq(excluded(auth_tokens::digest)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_user(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserId>, AuthTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let user_id: Option<i64> = auth_tokens::table
            .filter(auth_tokens::digest.eq(digest.as_ref()))
            .select(auth_tokens::user_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(user_id.map(UserId::new))
    }
}
