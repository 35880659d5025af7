//! In-memory tag and ingredient stores.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{LabelPersistenceError, LabelRepository};
use crate::domain::{IngredientKind, Label, LabelId, LabelKind, LabelName, TagKind, UserId, labels};

use super::{Sequence, lock};

struct LabelTable<K: LabelKind> {
    ids: Sequence,
    rows: Vec<Label<K>>,
}

/// [`LabelRepository`] for labels of kind `K`.
pub struct InMemoryLabelRepository<K: LabelKind> {
    table: Mutex<LabelTable<K>>,
}

/// In-memory tag store.
pub type InMemoryTagRepository = InMemoryLabelRepository<TagKind>;
/// In-memory ingredient store.
pub type InMemoryIngredientRepository = InMemoryLabelRepository<IngredientKind>;

impl<K: LabelKind> Default for InMemoryLabelRepository<K> {
    fn default() -> Self {
        Self {
            table: Mutex::new(LabelTable {
                ids: Sequence::default(),
                rows: Vec::new(),
            }),
        }
    }
}

impl<K: LabelKind> InMemoryLabelRepository<K> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels with the given ids, ordered by id. Unknown ids are skipped.
    pub(crate) fn resolve(&self, ids: &[LabelId<K>]) -> Result<Vec<Label<K>>, String> {
        let table = lock(&self.table, str::to_owned)?;
        let mut found: Vec<Label<K>> = table
            .rows
            .iter()
            .filter(|label| ids.contains(&label.id()))
            .cloned()
            .collect();
        found.sort_by_key(Label::id);
        Ok(found)
    }
}

#[async_trait]
impl<K: LabelKind> LabelRepository<K> for InMemoryLabelRepository<K> {
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Label<K>>, LabelPersistenceError> {
        let table = lock(&self.table, LabelPersistenceError::query)?;
        let mut owned: Vec<Label<K>> = table
            .rows
            .iter()
            .filter(|label| label.owner() == owner)
            .cloned()
            .collect();
        labels::sort_for_listing(&mut owned);
        Ok(owned)
    }

    async fn create(
        &self,
        owner: UserId,
        name: &LabelName,
    ) -> Result<Label<K>, LabelPersistenceError> {
        let mut table = lock(&self.table, LabelPersistenceError::query)?;
        let label = Label::new(LabelId::new(table.ids.next()), name.clone(), owner);
        table.rows.push(label.clone());
        Ok(label)
    }

    async fn find_owned(
        &self,
        owner: UserId,
        ids: &[LabelId<K>],
    ) -> Result<Vec<Label<K>>, LabelPersistenceError> {
        let table = lock(&self.table, LabelPersistenceError::query)?;
        Ok(table
            .rows
            .iter()
            .filter(|label| label.owner() == owner && ids.contains(&label.id()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn name(raw: &str) -> LabelName {
        LabelName::new(raw).expect("name")
    }

    #[rstest]
    #[tokio::test]
    async fn find_owned_skips_other_owners() {
        let repo = InMemoryTagRepository::new();
        let mine = repo.create(UserId::new(1), &name("Vegan")).await.expect("create");
        let theirs = repo.create(UserId::new(2), &name("Keto")).await.expect("create");

        let found = repo
            .find_owned(UserId::new(1), &[mine.id(), theirs.id()])
            .await
            .expect("lookup");
        assert_eq!(found, vec![mine]);
    }

    #[rstest]
    #[tokio::test]
    async fn listing_orders_by_name_descending() {
        let repo = InMemoryIngredientRepository::new();
        for raw in ["Kale", "Salt", "Apple"] {
            repo.create(UserId::new(1), &name(raw)).await.expect("create");
        }
        let listed = repo.list_for_owner(UserId::new(1)).await.expect("list");
        let names: Vec<&str> = listed.iter().map(|label| label.name().as_ref()).collect();
        assert_eq!(names, vec!["Salt", "Kale", "Apple"]);
    }
}
