//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every handler under `/api` plus the health probes
//! - **Schemas**: request and response DTOs, and the domain error wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that keep utoipa out of the
//!   domain
//! - **Security**: the `Authorization: Token <key>` header scheme
//!
//! The generated specification is served by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::labels::{LabelRequest, LabelResponse};
use crate::inbound::http::recipes::{
    RecipeDetailResponse, RecipeImageResponse, RecipeImageUpload, RecipeRequest, RecipeResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{
    CreateUserRequest, TokenRequest, TokenResponse, UpdateUserRequest, UserResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the token security scheme in the generated document.
pub const TOKEN_AUTH_SCHEME: &str = "TokenAuth";

/// Enrich the generated document with the token header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            TOKEN_AUTH_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "`Token <key>` with a key issued by POST /api/user/token.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipe backend API",
        description = "Token-authenticated recipe management: accounts, tags, ingredients, recipes and recipe images."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("TokenAuth" = [])),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::create_token,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::labels::list_tags,
        crate::inbound::http::labels::create_tag,
        crate::inbound::http::labels::list_ingredients,
        crate::inbound::http::labels::create_ingredient,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::replace_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::upload_image,
        crate::inbound::http::recipes::retrieve_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CreateUserRequest,
        UpdateUserRequest,
        TokenRequest,
        TokenResponse,
        UserResponse,
        LabelRequest,
        LabelResponse,
        RecipeRequest,
        RecipeResponse,
        RecipeDetailResponse,
        RecipeImageResponse,
        RecipeImageUpload,
        ProbeStatus,
    )),
    tags(
        (name = "users", description = "Account registration, tokens and profile"),
        (name = "tags", description = "Recipe tags owned by the caller"),
        (name = "ingredients", description = "Recipe ingredients owned by the caller"),
        (name = "recipes", description = "Recipes owned by the caller"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
