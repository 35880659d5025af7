//! Driving port for tag and ingredient use-cases.

use async_trait::async_trait;

use crate::domain::{Error, Label, LabelKind, LabelName, User};

/// Owner-scoped label use-cases, shared by tags and ingredients.
#[async_trait]
pub trait LabelCatalog<K: LabelKind>: Send + Sync {
    /// Labels owned by `actor`, name descending.
    async fn list(&self, actor: &User) -> Result<Vec<Label<K>>, Error>;

    /// Create a label owned by `actor`.
    async fn create(&self, actor: &User, name: LabelName) -> Result<Label<K>, Error>;
}
