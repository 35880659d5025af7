//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, the ports that connect them, and the services implementing the
//! driving ports. Types validate on construction and stay immutable.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, EmailAddress, UserName: account identity.
//! - Password, PasswordHash, AuthToken, LoginCredentials: authentication.
//! - Label (Tag, Ingredient): owner-scoped recipe labels.
//! - Recipe with its drafts, patches and image upload types.
//! - Services: IdentityService, LabelService, RecipeService.

pub mod auth;
pub mod error;
pub mod identity_service;
pub mod label_service;
pub mod labels;
pub mod ports;
pub mod recipe;
pub mod recipe_image;
pub mod recipe_service;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AuthToken, LoginCredentials, LoginValidationError, PASSWORD_MIN_LENGTH, Password,
    PasswordHash, PasswordValidationError, TokenDigest,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, NON_FIELD_ERRORS};
pub use self::identity_service::IdentityService;
pub use self::label_service::LabelService;
pub use self::labels::{
    Ingredient, IngredientId, IngredientKind, LABEL_NAME_MAX, Label, LabelId, LabelKind,
    LabelName, LabelValidationError, Tag, TagId, TagKind,
};
pub use self::recipe::{
    PRICE_MAX, Price, RECIPE_TEXT_MAX, Recipe, RecipeDraft, RecipeFields, RecipeId,
    RecipeImagePath, RecipeLink, RecipePatch, RecipeTitle, RecipeValidationError, TimeMinutes,
};
pub use self::recipe_image::{ImageValidationError, RECIPE_UPLOAD_DIR, ValidatedImage};
pub use self::recipe_service::RecipeService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, USER_FIELD_MAX, User, UserExtraFields, UserId, UserName, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use recipe_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
