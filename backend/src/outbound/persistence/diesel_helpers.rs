//! Shared helpers for Diesel repository implementations.
//!
//! - Error mapping from pool and Diesel errors into port error constructors.
//! - Row-to-domain conversions for value types stored as plain columns.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::{Label, LabelId, LabelKind, LabelName, UserId};

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Log a Diesel failure at `debug` with whatever context it carries.
fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Closed connections become connection errors; everything else, including
/// `NotFound`, becomes a query error.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    log_diesel_error(&error);
    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            query("referenced record does not exist")
        }
        _ => query("database error"),
    }
}

/// Whether `error` is a unique violation on the named constraint or index.
pub fn is_unique_violation(error: &DieselError, constraint: &str) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(constraint)
    )
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

/// Build a domain label from stored columns.
pub fn label_from_columns<K: LabelKind>(
    id: i64,
    user_id: i64,
    name: &str,
) -> Result<Label<K>, String> {
    let name = LabelName::new(name).map_err(|err| format!("{} {id}: {err}", K::NOUN))?;
    Ok(Label::new(LabelId::new(id), name, UserId::new(user_id)))
}

/// Raw ids for a Diesel `eq_any` filter.
pub fn raw_ids<K: LabelKind>(ids: &[LabelId<K>]) -> Vec<i64> {
    ids.iter().map(|id| id.as_i64()).collect()
}
