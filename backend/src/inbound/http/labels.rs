//! Tag and ingredient API handlers.
//!
//! ```text
//! GET  /api/recipe/tags
//! POST /api/recipe/tags {"name":"Vegan"}
//! GET  /api/recipe/ingredients
//! POST /api/recipe/ingredients {"name":"Salt"}
//! ```
//!
//! Both resources share one implementation; [`LabelRoute`] picks the
//! catalogue for a kind out of the HTTP state.

use std::sync::Arc;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::LabelCatalog;
use crate::domain::{Error, IngredientKind, Label, LabelKind, LabelName, TagKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldErrors, describe_label};

/// Label kinds exposed over HTTP.
pub trait LabelRoute: LabelKind {
    /// Catalogue serving this kind.
    fn catalog(state: &HttpState) -> &Arc<dyn LabelCatalog<Self>>;
}

impl LabelRoute for TagKind {
    fn catalog(state: &HttpState) -> &Arc<dyn LabelCatalog<Self>> {
        &state.tags
    }
}

impl LabelRoute for IngredientKind {
    fn catalog(state: &HttpState) -> &Arc<dyn LabelCatalog<Self>> {
        &state.ingredients
    }
}

/// Request body for creating a tag or ingredient.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LabelRequest {
    #[schema(example = "Vegan")]
    pub name: Option<String>,
}

/// A tag or ingredient as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LabelResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Vegan")]
    pub name: String,
}

impl<K: LabelKind> From<&Label<K>> for LabelResponse {
    fn from(label: &Label<K>) -> Self {
        Self {
            id: label.id().as_i64(),
            name: label.name().to_string(),
        }
    }
}

async fn list_labels<K: LabelRoute>(
    state: &HttpState,
    actor: &AuthenticatedUser,
) -> ApiResult<web::Json<Vec<LabelResponse>>> {
    let labels = K::catalog(state).list(actor.user()).await?;
    Ok(web::Json(labels.iter().map(LabelResponse::from).collect()))
}

async fn create_label<K: LabelRoute>(
    state: &HttpState,
    actor: &AuthenticatedUser,
    payload: LabelRequest,
) -> ApiResult<HttpResponse> {
    let mut errors = FieldErrors::new();
    let name = errors
        .require("name", payload.name)
        .and_then(|raw| errors.check("name", LabelName::new(&raw), describe_label));
    errors.finish()?;
    let name = name.ok_or_else(|| Error::internal("validated label name missing"))?;

    let label = K::catalog(state).create(actor.user(), name).await?;
    Ok(HttpResponse::Created().json(LabelResponse::from(&label)))
}

/// List the caller's tags, name descending.
#[utoipa::path(
    get,
    path = "/api/recipe/tags",
    responses(
        (status = 200, description = "Tags", body = [LabelResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "listTags"
)]
#[get("/recipe/tags")]
pub async fn list_tags(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<LabelResponse>>> {
    list_labels::<TagKind>(&state, &actor).await
}

/// Create a tag owned by the caller.
#[utoipa::path(
    post,
    path = "/api/recipe/tags",
    request_body = LabelRequest,
    responses(
        (status = 201, description = "Tag created", body = LabelResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "createTag"
)]
#[post("/recipe/tags")]
pub async fn create_tag(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
    payload: web::Json<LabelRequest>,
) -> ApiResult<HttpResponse> {
    create_label::<TagKind>(&state, &actor, payload.into_inner()).await
}

/// List the caller's ingredients, name descending.
#[utoipa::path(
    get,
    path = "/api/recipe/ingredients",
    responses(
        (status = 200, description = "Ingredients", body = [LabelResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "listIngredients"
)]
#[get("/recipe/ingredients")]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<LabelResponse>>> {
    list_labels::<IngredientKind>(&state, &actor).await
}

/// Create an ingredient owned by the caller.
#[utoipa::path(
    post,
    path = "/api/recipe/ingredients",
    request_body = LabelRequest,
    responses(
        (status = 201, description = "Ingredient created", body = LabelResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "createIngredient"
)]
#[post("/recipe/ingredients")]
pub async fn create_ingredient(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
    payload: web::Json<LabelRequest>,
) -> ApiResult<HttpResponse> {
    create_label::<IngredientKind>(&state, &actor, payload.into_inner()).await
}

#[cfg(test)]
#[path = "labels_tests.rs"]
mod tests;
