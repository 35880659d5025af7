//! In-memory recipe store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::ports::{ImageSwap, RecipePersistenceError, RecipeRepository};
use crate::domain::{
    IngredientId, Recipe, RecipeDraft, RecipeFields, RecipeId, RecipeImagePath, TagId, UserId,
};

use super::labels::{InMemoryIngredientRepository, InMemoryTagRepository};
use super::{Sequence, lock};

#[derive(Debug, Clone)]
struct RecipeEntry {
    id: RecipeId,
    owner: UserId,
    fields: RecipeFields,
    tags: Vec<TagId>,
    ingredients: Vec<IngredientId>,
    image: Option<RecipeImagePath>,
}

#[derive(Debug, Default)]
struct RecipeTable {
    ids: Sequence,
    rows: Vec<RecipeEntry>,
}

/// [`RecipeRepository`] resolving relations against the in-memory label
/// stores.
pub struct InMemoryRecipeRepository {
    table: Mutex<RecipeTable>,
    tags: Arc<InMemoryTagRepository>,
    ingredients: Arc<InMemoryIngredientRepository>,
}

impl InMemoryRecipeRepository {
    /// Create an empty store over the shared label stores.
    pub fn new(
        tags: Arc<InMemoryTagRepository>,
        ingredients: Arc<InMemoryIngredientRepository>,
    ) -> Self {
        Self {
            table: Mutex::new(RecipeTable::default()),
            tags,
            ingredients,
        }
    }

    fn hydrate(&self, entry: RecipeEntry) -> Result<Recipe, RecipePersistenceError> {
        Ok(Recipe {
            id: entry.id,
            owner: entry.owner,
            fields: entry.fields,
            tags: self
                .tags
                .resolve(&entry.tags)
                .map_err(RecipePersistenceError::query)?,
            ingredients: self
                .ingredients
                .resolve(&entry.ingredients)
                .map_err(RecipePersistenceError::query)?,
            image: entry.image,
        })
    }

    /// Copy out the entry matching `owner` and `id`, applying `update` first.
    fn with_owned<T>(
        &self,
        owner: UserId,
        id: RecipeId,
        update: impl FnOnce(&mut RecipeEntry) -> T,
    ) -> Result<Option<(RecipeEntry, T)>, RecipePersistenceError> {
        let mut table = lock(&self.table, RecipePersistenceError::query)?;
        Ok(table
            .rows
            .iter_mut()
            .find(|entry| entry.id == id && entry.owner == owner)
            .map(|entry| {
                let extra = update(entry);
                (entry.clone(), extra)
            }))
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Recipe>, RecipePersistenceError> {
        let mut owned: Vec<RecipeEntry> = {
            let table = lock(&self.table, RecipePersistenceError::query)?;
            table
                .rows
                .iter()
                .filter(|entry| entry.owner == owner)
                .cloned()
                .collect()
        };
        owned.sort_by(|a, b| b.id.cmp(&a.id));
        owned.into_iter().map(|entry| self.hydrate(entry)).collect()
    }

    async fn find_owned(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipePersistenceError> {
        self.with_owned(owner, id, |_| ())?
            .map(|(entry, ())| self.hydrate(entry))
            .transpose()
    }

    async fn create(
        &self,
        owner: UserId,
        draft: &RecipeDraft,
    ) -> Result<Recipe, RecipePersistenceError> {
        let entry = {
            let mut table = lock(&self.table, RecipePersistenceError::query)?;
            let entry = RecipeEntry {
                id: RecipeId::new(table.ids.next()),
                owner,
                fields: draft.fields.clone(),
                tags: draft.tags.clone(),
                ingredients: draft.ingredients.clone(),
                image: None,
            };
            table.rows.push(entry.clone());
            entry
        };
        self.hydrate(entry)
    }

    async fn replace(
        &self,
        owner: UserId,
        id: RecipeId,
        draft: &RecipeDraft,
    ) -> Result<Option<Recipe>, RecipePersistenceError> {
        self.with_owned(owner, id, |entry| {
            entry.fields = draft.fields.clone();
            entry.tags = draft.tags.clone();
            entry.ingredients = draft.ingredients.clone();
        })?
        .map(|(entry, ())| self.hydrate(entry))
        .transpose()
    }

    async fn set_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image: &RecipeImagePath,
    ) -> Result<Option<ImageSwap>, RecipePersistenceError> {
        let Some((entry, previous)) =
            self.with_owned(owner, id, |entry| entry.image.replace(image.clone()))?
        else {
            return Ok(None);
        };
        Ok(Some(ImageSwap {
            recipe: self.hydrate(entry)?,
            previous,
        }))
    }
}
