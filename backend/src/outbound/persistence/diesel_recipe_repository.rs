//! PostgreSQL-backed `RecipeRepository` implementation using Diesel ORM.
//!
//! Recipes are loaded in two steps: the recipe rows, then their tag and
//! ingredient joins for all loaded ids at once. Writes touching join rows
//! run in a single transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{ImageSwap, RecipePersistenceError, RecipeRepository};
use crate::domain::{
    Ingredient, Price, Recipe, RecipeDraft, RecipeFields, RecipeId, RecipeImagePath, RecipeLink,
    RecipeTitle, Tag, TimeMinutes, UserId,
};

use super::diesel_helpers::{
    collect_rows, label_from_columns, map_basic_diesel_error, map_pool_error_message,
};
use super::models::{
    IngredientRow, NewRecipeRow, RecipeFieldsChangeset, RecipeIngredientRow, RecipeRow,
    RecipeTagRow, TagRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};

/// Diesel-backed implementation of the [`RecipeRepository`] port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipePersistenceError {
    RecipePersistenceError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> RecipePersistenceError {
    map_basic_diesel_error(
        error,
        RecipePersistenceError::query,
        RecipePersistenceError::connection,
    )
}

/// A recipe row with its joined label rows.
struct LoadedRecipe {
    row: RecipeRow,
    tags: Vec<TagRow>,
    ingredients: Vec<IngredientRow>,
}

/// Attach tag and ingredient rows to each recipe row, keeping row order.
async fn load_relations(
    conn: &mut AsyncPgConnection,
    rows: Vec<RecipeRow>,
) -> QueryResult<Vec<LoadedRecipe>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

    let tag_links: Vec<(i64, TagRow)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(ids.clone()))
        .order(tags::id.asc())
        .select((recipe_tags::recipe_id, TagRow::as_select()))
        .load(conn)
        .await?;
    let ingredient_links: Vec<(i64, IngredientRow)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(ids))
        .order(ingredients::id.asc())
        .select((recipe_ingredients::recipe_id, IngredientRow::as_select()))
        .load(conn)
        .await?;

    let mut tags_by_recipe: HashMap<i64, Vec<TagRow>> = HashMap::new();
    for (recipe_id, tag) in tag_links {
        tags_by_recipe.entry(recipe_id).or_default().push(tag);
    }
    let mut ingredients_by_recipe: HashMap<i64, Vec<IngredientRow>> = HashMap::new();
    for (recipe_id, ingredient) in ingredient_links {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(ingredient);
    }

    Ok(rows
        .into_iter()
        .map(|row| LoadedRecipe {
            tags: tags_by_recipe.remove(&row.id).unwrap_or_default(),
            ingredients: ingredients_by_recipe.remove(&row.id).unwrap_or_default(),
            row,
        })
        .collect())
}

/// Replace the join rows of `recipe_id` with the draft's relation ids.
async fn write_relations(
    conn: &mut AsyncPgConnection,
    recipe_id: i64,
    draft: &RecipeDraft,
) -> QueryResult<()> {
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
        .execute(conn)
        .await?;
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)
        .await?;

    let tag_rows: Vec<RecipeTagRow> = draft
        .tags
        .iter()
        .map(|tag| RecipeTagRow {
            recipe_id,
            tag_id: tag.as_i64(),
        })
        .collect();
    if !tag_rows.is_empty() {
        diesel::insert_into(recipe_tags::table)
            .values(&tag_rows)
            .execute(conn)
            .await?;
    }

    let ingredient_rows: Vec<RecipeIngredientRow> = draft
        .ingredients
        .iter()
        .map(|ingredient| RecipeIngredientRow {
            recipe_id,
            ingredient_id: ingredient.as_i64(),
        })
        .collect();
    if !ingredient_rows.is_empty() {
        diesel::insert_into(recipe_ingredients::table)
            .values(&ingredient_rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

fn fields_from_row(row: &RecipeRow) -> Result<RecipeFields, String> {
    let context = |err: crate::domain::RecipeValidationError| format!("recipe {}: {err}", row.id);
    Ok(RecipeFields {
        title: RecipeTitle::new(&row.title).map_err(context)?,
        time_minutes: TimeMinutes::new(row.time_minutes).map_err(context)?,
        price: Price::new(row.price).map_err(context)?,
        link: RecipeLink::new(&row.link).map_err(context)?,
    })
}

fn to_recipe(loaded: LoadedRecipe) -> Result<Recipe, String> {
    let LoadedRecipe {
        row,
        tags,
        ingredients,
    } = loaded;
    let tags: Vec<Tag> = tags
        .iter()
        .map(|tag| label_from_columns(tag.id, tag.user_id, &tag.name))
        .collect::<Result<_, _>>()?;
    let ingredients: Vec<Ingredient> = ingredients
        .iter()
        .map(|ingredient| label_from_columns(ingredient.id, ingredient.user_id, &ingredient.name))
        .collect::<Result<_, _>>()?;

    Ok(Recipe {
        id: RecipeId::new(row.id),
        owner: UserId::new(row.user_id),
        fields: fields_from_row(&row)?,
        tags,
        ingredients,
        image: row.image.map(RecipeImagePath::from_stored),
    })
}

fn to_recipes(loaded: Vec<LoadedRecipe>) -> Result<Vec<Recipe>, RecipePersistenceError> {
    collect_rows(loaded.into_iter().map(to_recipe), RecipePersistenceError::query)
}

fn to_single(loaded: Option<LoadedRecipe>) -> Result<Option<Recipe>, RecipePersistenceError> {
    loaded
        .map(to_recipe)
        .transpose()
        .map_err(RecipePersistenceError::query)
}

fn fields_changeset(draft: &RecipeDraft) -> RecipeFieldsChangeset<'_> {
    RecipeFieldsChangeset {
        title: draft.fields.title.as_ref(),
        time_minutes: draft.fields.time_minutes.get(),
        price: draft.fields.price.amount(),
        link: draft.fields.link.as_ref(),
    }
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let loaded = conn
            .transaction(|conn| {
                async move {
                    let rows: Vec<RecipeRow> = recipes::table
                        .filter(recipes::user_id.eq(owner.as_i64()))
                        .order(recipes::id.desc())
                        .select(RecipeRow::as_select())
                        .load(conn)
                        .await?;
                    load_relations(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        to_recipes(loaded)
    }

    async fn find_owned(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let loaded = conn
            .transaction(|conn| {
                async move {
                    let row: Option<RecipeRow> = recipes::table
                        .filter(recipes::id.eq(id.as_i64()))
                        .filter(recipes::user_id.eq(owner.as_i64()))
                        .select(RecipeRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let loaded = load_relations(conn, row.into_iter().collect()).await?;
                    Ok::<_, diesel::result::Error>(loaded.into_iter().next())
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        to_single(loaded)
    }

    async fn create(
        &self,
        owner: UserId,
        draft: &RecipeDraft,
    ) -> Result<Recipe, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewRecipeRow {
            user_id: owner.as_i64(),
            title: draft.fields.title.as_ref(),
            time_minutes: draft.fields.time_minutes.get(),
            price: draft.fields.price.amount(),
            link: draft.fields.link.as_ref(),
        };

        let loaded = conn
            .transaction(|conn| {
                async move {
                    let row: RecipeRow = diesel::insert_into(recipes::table)
                        .values(&new_row)
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;
                    write_relations(conn, row.id, draft).await?;
                    load_relations(conn, vec![row]).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        to_single(loaded.into_iter().next())?
            .ok_or_else(|| RecipePersistenceError::query("inserted recipe was not returned"))
    }

    async fn replace(
        &self,
        owner: UserId,
        id: RecipeId,
        draft: &RecipeDraft,
    ) -> Result<Option<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = fields_changeset(draft);

        let loaded = conn
            .transaction(|conn| {
                async move {
                    let row: Option<RecipeRow> = diesel::update(
                        recipes::table
                            .filter(recipes::id.eq(id.as_i64()))
                            .filter(recipes::user_id.eq(owner.as_i64())),
                    )
                    .set(&changeset)
                    .returning(RecipeRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;
                    let Some(row) = row else {
                        return Ok(None);
                    };
                    write_relations(conn, row.id, draft).await?;
                    load_relations(conn, vec![row])
                        .await
                        .map(|loaded| loaded.into_iter().next())
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        to_single(loaded)
    }

    async fn set_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image: &RecipeImagePath,
    ) -> Result<Option<ImageSwap>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let path = image.as_ref();

        let swapped = conn
            .transaction(|conn| {
                async move {
                    let previous: Option<Option<String>> = recipes::table
                        .filter(recipes::id.eq(id.as_i64()))
                        .filter(recipes::user_id.eq(owner.as_i64()))
                        .select(recipes::image)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(previous) = previous else {
                        return Ok(None);
                    };
                    let row: RecipeRow = diesel::update(recipes::table.find(id.as_i64()))
                        .set(recipes::image.eq(Some(path)))
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;
                    let loaded = load_relations(conn, vec![row]).await?.into_iter().next();
                    Ok::<_, diesel::result::Error>(loaded.map(|loaded| (loaded, previous)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let Some((loaded, previous)) = swapped else {
            return Ok(None);
        };
        let recipe = to_recipe(loaded).map_err(RecipePersistenceError::query)?;
        Ok(Some(ImageSwap {
            recipe,
            previous: previous.map(RecipeImagePath::from_stored),
        }))
    }
}
