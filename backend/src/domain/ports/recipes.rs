//! Driving port for recipe use-cases.

use async_trait::async_trait;

use crate::domain::{Error, Recipe, RecipeDraft, RecipeId, RecipePatch, User, ValidatedImage};

/// Owner-scoped recipe use-cases. Recipes not owned by the actor behave as
/// missing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeBook: Send + Sync {
    /// Recipes owned by `actor`, newest first.
    async fn list(&self, actor: &User) -> Result<Vec<Recipe>, Error>;

    /// One recipe or not found.
    async fn get(&self, actor: &User, id: RecipeId) -> Result<Recipe, Error>;

    /// Create a recipe; referenced labels must belong to `actor`.
    async fn create(&self, actor: &User, draft: RecipeDraft) -> Result<Recipe, Error>;

    /// Full replacement: omitted relations are cleared.
    async fn replace(&self, actor: &User, id: RecipeId, draft: RecipeDraft)
    -> Result<Recipe, Error>;

    /// Partial update: omitted fields and relations are kept.
    async fn patch(&self, actor: &User, id: RecipeId, patch: RecipePatch) -> Result<Recipe, Error>;

    /// Store `image` and attach it, removing any previous file.
    async fn attach_image(
        &self,
        actor: &User,
        id: RecipeId,
        image: ValidatedImage,
    ) -> Result<Recipe, Error>;
}
