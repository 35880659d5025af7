//! Recipe API handlers.
//!
//! ```text
//! GET   /api/recipe/recipes
//! POST  /api/recipe/recipes {"title":"Cake","time_minutes":60,"price":"20.00","tags":[1,2]}
//! GET   /api/recipe/recipes/{id}
//! PUT   /api/recipe/recipes/{id}
//! PATCH /api/recipe/recipes/{id}
//! POST  /api/recipe/recipes/{id}/upload-image   (multipart, field "image")
//! GET   /api/recipe/recipes/{id}/retrieve-image
//! ```
//!
//! List, create and update responses carry tag and ingredient ids; the
//! detail view nests `{id, name}` objects instead.

use std::str::FromStr;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, patch, post, put, web};
use futures_util::TryStreamExt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{
    Error, ImageValidationError, IngredientId, Price, Recipe, RecipeDraft, RecipeFields,
    RecipeId, RecipeLink, RecipePatch, RecipeTitle, TagId, TimeMinutes, ValidatedImage,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::labels::LabelResponse;
use crate::inbound::http::state::{HttpState, MediaSettings};
use crate::inbound::http::validation::{FieldErrors, REQUIRED, describe_recipe};

const IMAGE_FIELD: &str = "image";
const NOT_A_NUMBER: &str = "A valid number is required.";
const NO_FILE: &str = "No file was submitted.";
const EMPTY_FILE: &str = "The submitted file is empty.";
const NOT_AN_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Request body for creating or updating a recipe.
///
/// `POST` and `PUT` require `title`, `time_minutes` and `price`; `PATCH`
/// accepts any subset.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RecipeRequest {
    #[schema(example = "Cake")]
    pub title: Option<String>,
    #[schema(example = 60)]
    pub time_minutes: Option<i32>,
    /// Decimal amount as a JSON number or string.
    #[schema(value_type = Option<String>, example = "20.00")]
    pub price: Option<Value>,
    #[schema(example = "https://example.com/cake")]
    pub link: Option<String>,
    /// Tag ids owned by the caller.
    pub tags: Option<Vec<i64>>,
    /// Ingredient ids owned by the caller.
    pub ingredients: Option<Vec<i64>>,
}

/// Recipe as returned by list, create and update.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    #[schema(example = "20.00")]
    pub price: String,
    pub link: String,
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
}

impl From<&Recipe> for RecipeResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.as_i64(),
            title: recipe.fields.title.to_string(),
            time_minutes: recipe.fields.time_minutes.get(),
            price: recipe.fields.price.to_string(),
            link: recipe.fields.link.as_ref().to_owned(),
            tags: recipe.tags.iter().map(|tag| tag.id().as_i64()).collect(),
            ingredients: recipe
                .ingredients
                .iter()
                .map(|ingredient| ingredient.id().as_i64())
                .collect(),
        }
    }
}

/// Recipe detail with nested labels.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeDetailResponse {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    #[schema(example = "20.00")]
    pub price: String,
    pub link: String,
    pub tags: Vec<LabelResponse>,
    pub ingredients: Vec<LabelResponse>,
}

impl From<&Recipe> for RecipeDetailResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.as_i64(),
            title: recipe.fields.title.to_string(),
            time_minutes: recipe.fields.time_minutes.get(),
            price: recipe.fields.price.to_string(),
            link: recipe.fields.link.as_ref().to_owned(),
            tags: recipe.tags.iter().map(LabelResponse::from).collect(),
            ingredients: recipe.ingredients.iter().map(LabelResponse::from).collect(),
        }
    }
}

/// Image view of a recipe.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeImageResponse {
    pub id: i64,
    /// Public URL of the image, `null` before the first upload.
    #[schema(example = "/media/uploads/recipe/0b5e1c1e-9f5e-4a57-a1b4-1f0f8f4a2f10.png")]
    pub image: Option<String>,
}

impl RecipeImageResponse {
    fn new(recipe: &Recipe, media: &MediaSettings) -> Self {
        Self {
            id: recipe.id.as_i64(),
            image: recipe.image.as_ref().map(|path| media.url_for(path)),
        }
    }
}

/// Multipart body for `upload-image`.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct RecipeImageUpload {
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// Parse a JSON number or numeric string as a decimal.
fn parse_decimal(raw: &Value) -> Option<Decimal> {
    let text = match raw {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_owned(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn check_price(errors: &mut FieldErrors, raw: &Value) -> Option<Price> {
    let Some(amount) = parse_decimal(raw) else {
        errors.add("price", NOT_A_NUMBER);
        return None;
    };
    errors.check("price", Price::new(amount), describe_recipe)
}

/// Validate every supplied field. With `require_core`, a missing title,
/// time or price is an error too.
fn parse_fields(payload: RecipeRequest, require_core: bool) -> Result<RecipePatch, Error> {
    let RecipeRequest {
        title,
        time_minutes,
        price,
        link,
        tags,
        ingredients,
    } = payload;
    let mut errors = FieldErrors::new();

    if require_core {
        for (field, present) in [
            ("title", title.is_some()),
            ("time_minutes", time_minutes.is_some()),
            ("price", price.is_some()),
        ] {
            if !present {
                errors.add(field, REQUIRED);
            }
        }
    }

    let patch = RecipePatch {
        title: title.and_then(|raw| errors.check("title", RecipeTitle::new(&raw), describe_recipe)),
        time_minutes: time_minutes
            .and_then(|raw| errors.check("time_minutes", TimeMinutes::new(raw), describe_recipe)),
        price: price.and_then(|raw| check_price(&mut errors, &raw)),
        link: link.and_then(|raw| errors.check("link", RecipeLink::new(&raw), describe_recipe)),
        tags: tags.map(|ids| ids.into_iter().map(TagId::new).collect()),
        ingredients: ingredients.map(|ids| ids.into_iter().map(IngredientId::new).collect()),
    };
    errors.finish()?;
    Ok(patch)
}

/// Validate a full recipe body. Omitted relations become empty sets.
fn parse_draft(payload: RecipeRequest) -> Result<RecipeDraft, Error> {
    let patch = parse_fields(payload, true)?;
    let (Some(title), Some(time_minutes), Some(price)) =
        (patch.title, patch.time_minutes, patch.price)
    else {
        return Err(Error::internal("validated recipe fields missing"));
    };
    Ok(RecipeDraft {
        fields: RecipeFields {
            title,
            time_minutes,
            price,
            link: patch.link.unwrap_or_default(),
        },
        tags: patch.tags.unwrap_or_default(),
        ingredients: patch.ingredients.unwrap_or_default(),
    })
}

fn multipart_error(err: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("Multipart form parse error - {err}"))
}

/// The `image` part of an upload: its bytes and the client's file name.
struct ImageField {
    bytes: Vec<u8>,
    file_name: Option<String>,
}

/// Read the `image` field, enforcing the upload limit. Other fields are
/// drained and ignored.
async fn read_image_field(mut payload: Multipart, limit: usize) -> Result<ImageField, Error> {
    let mut image = None;
    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let wanted = image.is_none() && field.name() == Some(IMAGE_FIELD);
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            if !wanted {
                continue;
            }
            if bytes.len() + chunk.len() > limit {
                return Err(Error::field(
                    IMAGE_FIELD,
                    format!("Ensure the uploaded file is at most {limit} bytes."),
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        if wanted {
            image = Some(ImageField { bytes, file_name });
        }
    }
    image.ok_or_else(|| Error::field(IMAGE_FIELD, NO_FILE))
}

fn describe_image(err: &ImageValidationError) -> &'static str {
    match err {
        ImageValidationError::Empty => EMPTY_FILE,
        ImageValidationError::NotAnImage => NOT_AN_IMAGE,
    }
}

/// List the caller's recipes, newest first.
#[utoipa::path(
    get,
    path = "/api/recipe/recipes",
    responses(
        (status = 200, description = "Recipes", body = [RecipeResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes"
)]
#[get("/recipe/recipes")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<RecipeResponse>>> {
    let recipes = state.recipes.list(actor.user()).await?;
    Ok(web::Json(recipes.iter().map(RecipeResponse::from).collect()))
}

/// Create a recipe owned by the caller.
#[utoipa::path(
    post,
    path = "/api/recipe/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipe/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_draft(payload.into_inner())?;
    let recipe = state.recipes.create(actor.user(), draft).await?;
    Ok(HttpResponse::Created().json(RecipeResponse::from(&recipe)))
}

/// One recipe with nested tags and ingredients.
#[utoipa::path(
    get,
    path = "/api/recipe/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeDetailResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe"
)]
#[get("/recipe/recipes/{id}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
    id: web::Path<i64>,
) -> ApiResult<web::Json<RecipeDetailResponse>> {
    let recipe = state
        .recipes
        .get(actor.user(), RecipeId::new(id.into_inner()))
        .await?;
    Ok(web::Json(RecipeDetailResponse::from(&recipe)))
}

/// Replace a recipe. Omitted tags and ingredients are cleared.
#[utoipa::path(
    put,
    path = "/api/recipe/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe replaced", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "replaceRecipe"
)]
#[put("/recipe/recipes/{id}")]
pub async fn replace_recipe(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
    id: web::Path<i64>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let draft = parse_draft(payload.into_inner())?;
    let recipe = state
        .recipes
        .replace(actor.user(), RecipeId::new(id.into_inner()), draft)
        .await?;
    Ok(web::Json(RecipeResponse::from(&recipe)))
}

/// Update the supplied fields of a recipe, keeping everything else.
#[utoipa::path(
    patch,
    path = "/api/recipe/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[patch("/recipe/recipes/{id}")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
    id: web::Path<i64>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let patch = parse_fields(payload.into_inner(), false)?;
    let recipe = state
        .recipes
        .patch(actor.user(), RecipeId::new(id.into_inner()), patch)
        .await?;
    Ok(web::Json(RecipeResponse::from(&recipe)))
}

/// Attach an image to a recipe, replacing any previous one.
#[utoipa::path(
    post,
    path = "/api/recipe/recipes/{id}/upload-image",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body(content = RecipeImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = RecipeImageResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "uploadRecipeImage"
)]
#[post("/recipe/recipes/{id}/upload-image")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
    id: web::Path<i64>,
    payload: Multipart,
) -> ApiResult<web::Json<RecipeImageResponse>> {
    let id = RecipeId::new(id.into_inner());
    let ImageField { bytes, file_name } =
        read_image_field(payload, state.media.max_upload_bytes()).await?;
    debug!(recipe_id = %id, len = bytes.len(), "received recipe image");

    let image = web::block(move || ValidatedImage::from_upload(bytes, file_name.as_deref()))
        .await
        .map_err(|err| Error::internal(format!("image validation task failed: {err}")))?
        .map_err(|err| Error::field(IMAGE_FIELD, describe_image(&err)))?;

    let recipe = state.recipes.attach_image(actor.user(), id, image).await?;
    Ok(web::Json(RecipeImageResponse::new(&recipe, &state.media)))
}

/// The recipe's image URL.
#[utoipa::path(
    get,
    path = "/api/recipe/recipes/{id}/retrieve-image",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe image", body = RecipeImageResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "retrieveRecipeImage"
)]
#[get("/recipe/recipes/{id}/retrieve-image")]
pub async fn retrieve_image(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
    id: web::Path<i64>,
) -> ApiResult<web::Json<RecipeImageResponse>> {
    let recipe = state
        .recipes
        .get(actor.user(), RecipeId::new(id.into_inner()))
        .await?;
    Ok(web::Json(RecipeImageResponse::new(&recipe, &state.media)))
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
