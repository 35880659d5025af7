//! PostgreSQL-backed `LabelRepository` implementations for tags and
//! ingredients.
//!
//! Both tables share one shape, so the adapters are stamped out by
//! `label_repository!` with the table, row types and kind marker swapped.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LabelPersistenceError, LabelRepository};
use crate::domain::{IngredientKind, Label, LabelId, LabelName, TagKind, UserId};

use super::diesel_helpers::{
    collect_rows, label_from_columns, map_basic_diesel_error, map_pool_error_message, raw_ids,
};
use super::models::{IngredientRow, NewIngredientRow, NewTagRow, TagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, tags};

fn map_pool_error(error: PoolError) -> LabelPersistenceError {
    LabelPersistenceError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> LabelPersistenceError {
    map_basic_diesel_error(
        error,
        LabelPersistenceError::query,
        LabelPersistenceError::connection,
    )
}

macro_rules! label_repository {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:ty, $table:ident, $row:ident, $new_row:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            pool: DbPool,
        }

        impl $name {
            /// Create a new repository with the given connection pool.
            pub fn new(pool: DbPool) -> Self {
                Self { pool }
            }

            fn to_labels(rows: Vec<$row>) -> Result<Vec<Label<$kind>>, LabelPersistenceError> {
                collect_rows(
                    rows.iter()
                        .map(|row| label_from_columns(row.id, row.user_id, &row.name)),
                    LabelPersistenceError::query,
                )
            }
        }

        #[async_trait]
        impl LabelRepository<$kind> for $name {
            async fn list_for_owner(
                &self,
                owner: UserId,
            ) -> Result<Vec<Label<$kind>>, LabelPersistenceError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;

                let rows: Vec<$row> = $table::table
                    .filter($table::user_id.eq(owner.as_i64()))
                    .order(($table::name.desc(), $table::id.desc()))
                    .select($row::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;

                Self::to_labels(rows)
            }

            async fn create(
                &self,
                owner: UserId,
                name: &LabelName,
            ) -> Result<Label<$kind>, LabelPersistenceError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let new_row = $new_row {
                    user_id: owner.as_i64(),
                    name: name.as_ref(),
                };

                let row: $row = diesel::insert_into($table::table)
                    .values(&new_row)
                    .returning($row::as_returning())
                    .get_result(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;

                Ok(Label::new(LabelId::new(row.id), name.clone(), owner))
            }

            async fn find_owned(
                &self,
                owner: UserId,
                ids: &[LabelId<$kind>],
            ) -> Result<Vec<Label<$kind>>, LabelPersistenceError> {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;

                let rows: Vec<$row> = $table::table
                    .filter($table::user_id.eq(owner.as_i64()))
                    .filter($table::id.eq_any(raw_ids(ids)))
                    .select($row::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;

                Self::to_labels(rows)
            }
        }
    };
}

label_repository! {
    /// Diesel-backed tag storage.
    DieselTagRepository, TagKind, tags, TagRow, NewTagRow
}

label_repository! {
    /// Diesel-backed ingredient storage.
    DieselIngredientRepository, IngredientKind, ingredients, IngredientRow, NewIngredientRow
}
