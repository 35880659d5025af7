//! Recipe service.
//!
//! Implements [`RecipeBook`]: owner-scoped reads and writes, verification
//! that referenced tags and ingredients belong to the actor, and image
//! replacement with cleanup of superseded files.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::label_service::map_label_error;
use crate::domain::ports::{
    LabelRepository, MediaStorage, MediaStorageError, RecipeBook, RecipePersistenceError,
    RecipeRepository,
};
use crate::domain::{
    Error, IngredientKind, LabelId, LabelKind, Recipe, RecipeDraft, RecipeId, RecipeImagePath,
    RecipePatch, TagKind, User, ValidatedImage,
};

/// Recipe service over the recipe, label and media adapters.
pub struct RecipeService<R, T, I, M> {
    recipes: Arc<R>,
    tags: Arc<T>,
    ingredients: Arc<I>,
    media: Arc<M>,
}

impl<R, T, I, M> Clone for RecipeService<R, T, I, M> {
    fn clone(&self) -> Self {
        Self {
            recipes: Arc::clone(&self.recipes),
            tags: Arc::clone(&self.tags),
            ingredients: Arc::clone(&self.ingredients),
            media: Arc::clone(&self.media),
        }
    }
}

impl<R, T, I, M> RecipeService<R, T, I, M> {
    /// Create a new service over the given adapters.
    pub fn new(recipes: Arc<R>, tags: Arc<T>, ingredients: Arc<I>, media: Arc<M>) -> Self {
        Self {
            recipes,
            tags,
            ingredients,
            media,
        }
    }
}

fn map_recipe_error(error: RecipePersistenceError) -> Error {
    match error {
        RecipePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("recipe repository unavailable: {message}"))
        }
        RecipePersistenceError::Query { message } => {
            Error::internal(format!("recipe repository error: {message}"))
        }
    }
}

fn map_media_error(error: MediaStorageError) -> Error {
    Error::internal(error.to_string())
}

fn recipe_not_found() -> Error {
    Error::not_found("No Recipe matches the given query.")
}

/// Drop repeated ids, keeping first occurrences in order.
fn dedup_ids<K: LabelKind>(ids: &mut Vec<LabelId<K>>) {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.retain(|id| seen.insert(*id));
}

/// Fail with a field error naming the first id `repo` does not hold for
/// `actor`.
async fn ensure_owned<K, L>(
    repo: &L,
    actor: &User,
    field: &str,
    ids: &[LabelId<K>],
) -> Result<(), Error>
where
    K: LabelKind,
    L: LabelRepository<K> + ?Sized,
{
    if ids.is_empty() {
        return Ok(());
    }
    let owned = repo
        .find_owned(actor.id(), ids)
        .await
        .map_err(map_label_error::<K>)?;
    if let Some(missing) = ids
        .iter()
        .find(|id| !owned.iter().any(|label| label.id() == **id))
    {
        return Err(Error::field(
            field,
            format!("Invalid pk \"{missing}\" - object does not exist."),
        ));
    }
    Ok(())
}

impl<R, T, I, M> RecipeService<R, T, I, M>
where
    R: RecipeRepository,
    T: LabelRepository<TagKind>,
    I: LabelRepository<IngredientKind>,
    M: MediaStorage,
{
    async fn prepare(&self, actor: &User, mut draft: RecipeDraft) -> Result<RecipeDraft, Error> {
        dedup_ids(&mut draft.tags);
        dedup_ids(&mut draft.ingredients);
        ensure_owned(self.tags.as_ref(), actor, "tags", &draft.tags).await?;
        ensure_owned(self.ingredients.as_ref(), actor, "ingredients", &draft.ingredients).await?;
        Ok(draft)
    }

    async fn find(&self, actor: &User, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find_owned(actor.id(), id)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(recipe_not_found)
    }

    async fn store_replacement(
        &self,
        actor: &User,
        id: RecipeId,
        draft: RecipeDraft,
    ) -> Result<Recipe, Error> {
        let draft = self.prepare(actor, draft).await?;
        let recipe = self
            .recipes
            .replace(actor.id(), id, &draft)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(recipe_not_found)?;
        info!(recipe_id = %recipe.id, owner = %actor.id(), "updated recipe");
        Ok(recipe)
    }

    async fn discard(&self, path: &RecipeImagePath) {
        if let Err(err) = self.media.remove(path).await {
            warn!(path = %path, error = %err, "failed to remove recipe image");
        }
    }
}

#[async_trait]
impl<R, T, I, M> RecipeBook for RecipeService<R, T, I, M>
where
    R: RecipeRepository,
    T: LabelRepository<TagKind>,
    I: LabelRepository<IngredientKind>,
    M: MediaStorage,
{
    async fn list(&self, actor: &User) -> Result<Vec<Recipe>, Error> {
        self.recipes
            .list_for_owner(actor.id())
            .await
            .map_err(map_recipe_error)
    }

    async fn get(&self, actor: &User, id: RecipeId) -> Result<Recipe, Error> {
        self.find(actor, id).await
    }

    async fn create(&self, actor: &User, draft: RecipeDraft) -> Result<Recipe, Error> {
        let draft = self.prepare(actor, draft).await?;
        let recipe = self
            .recipes
            .create(actor.id(), &draft)
            .await
            .map_err(map_recipe_error)?;
        info!(recipe_id = %recipe.id, owner = %actor.id(), "created recipe");
        Ok(recipe)
    }

    async fn replace(
        &self,
        actor: &User,
        id: RecipeId,
        draft: RecipeDraft,
    ) -> Result<Recipe, Error> {
        self.store_replacement(actor, id, draft).await
    }

    async fn patch(&self, actor: &User, id: RecipeId, patch: RecipePatch) -> Result<Recipe, Error> {
        let current = self.find(actor, id).await?;
        self.store_replacement(actor, id, patch.apply_to(&current))
            .await
    }

    async fn attach_image(
        &self,
        actor: &User,
        id: RecipeId,
        image: ValidatedImage,
    ) -> Result<Recipe, Error> {
        self.find(actor, id).await?;

        let path = image.new_storage_path();
        self.media
            .save(&path, image.bytes())
            .await
            .map_err(map_media_error)?;

        let swap = match self.recipes.set_image(actor.id(), id, &path).await {
            Ok(Some(swap)) => swap,
            Ok(None) => {
                self.discard(&path).await;
                return Err(recipe_not_found());
            }
            Err(err) => {
                self.discard(&path).await;
                return Err(map_recipe_error(err));
            }
        };

        if let Some(previous) = swap.previous.as_ref().filter(|prev| **prev != path) {
            self.discard(previous).await;
        }
        info!(recipe_id = %id, owner = %actor.id(), image = %path, "stored recipe image");
        Ok(swap.recipe)
    }
}

#[cfg(test)]
#[path = "recipe_service_tests.rs"]
mod tests;
