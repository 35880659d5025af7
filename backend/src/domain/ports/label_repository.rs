//! Port abstraction for tag and ingredient persistence.
use async_trait::async_trait;

use crate::domain::{Label, LabelId, LabelKind, LabelName, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by label repository adapters.
    pub enum LabelPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "label repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "label repository query failed: {message}",
    }
}

/// Owner-scoped storage for labels of kind `K`.
#[async_trait]
pub trait LabelRepository<K: LabelKind>: Send + Sync {
    /// All labels owned by `owner`, name descending then id descending.
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Label<K>>, LabelPersistenceError>;

    /// Insert a label for `owner`.
    async fn create(
        &self,
        owner: UserId,
        name: &LabelName,
    ) -> Result<Label<K>, LabelPersistenceError>;

    /// The subset of `ids` owned by `owner`.
    async fn find_owned(
        &self,
        owner: UserId,
        ids: &[LabelId<K>],
    ) -> Result<Vec<Label<K>>, LabelPersistenceError>;
}
