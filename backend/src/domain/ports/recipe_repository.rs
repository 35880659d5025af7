//! Port abstraction for recipe persistence.
use async_trait::async_trait;

use crate::domain::{Recipe, RecipeDraft, RecipeId, RecipeImagePath, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by recipe repository adapters.
    pub enum RecipePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
    }
}

/// Result of attaching an image to a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSwap {
    /// The recipe after the update.
    pub recipe: Recipe,
    /// Path that was replaced, if any; the caller removes the file.
    pub previous: Option<RecipeImagePath>,
}

/// Owner-scoped recipe storage. Every lookup is filtered by `owner`, so a
/// recipe belonging to someone else is indistinguishable from a missing one.
///
/// Relation ids passed in drafts must already be verified as owned by
/// `owner`. Writes touching join rows are atomic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// All recipes owned by `owner`, id descending.
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Recipe>, RecipePersistenceError>;

    /// One recipe, if owned by `owner`.
    async fn find_owned(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipePersistenceError>;

    /// Insert a recipe with its relations.
    async fn create(
        &self,
        owner: UserId,
        draft: &RecipeDraft,
    ) -> Result<Recipe, RecipePersistenceError>;

    /// Overwrite fields and relation sets; `None` when not owned.
    async fn replace(
        &self,
        owner: UserId,
        id: RecipeId,
        draft: &RecipeDraft,
    ) -> Result<Option<Recipe>, RecipePersistenceError>;

    /// Point the recipe at a new image; `None` when not owned.
    async fn set_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image: &RecipeImagePath,
    ) -> Result<Option<ImageSwap>, RecipePersistenceError>;
}
