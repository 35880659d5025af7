//! Account API handlers.
//!
//! ```text
//! POST  /api/user/create {"email":"ada@example.com","password":"secret","name":"Ada"}
//! POST  /api/user/token  {"email":"ada@example.com","password":"secret"}
//! GET   /api/user/me
//! PATCH /api/user/me     {"name":"Ada L"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::ProfileUpdate;
use crate::domain::{
    EmailAddress, Error, LoginCredentials, Password, User, UserExtraFields, UserName,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{BLANK, FieldErrors, describe_password, describe_user};

/// Request body for `POST /api/user/create`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    /// Write-only; at least 5 characters.
    #[schema(example = "testpass123")]
    pub password: Option<String>,
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
}

/// Request body for `PATCH /api/user/me`. `email` is read-only here.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Request body for `POST /api/user/token`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public view of an account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email().to_string(),
            name: user.name().to_string(),
        }
    }
}

/// Issued API token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    pub token: String,
}

/// Validate a password, rejecting empty input as blank.
fn check_password(errors: &mut FieldErrors, raw: &str) -> Option<Password> {
    if raw.is_empty() {
        errors.add("password", BLANK);
        return None;
    }
    errors.check("password", Password::new(raw), describe_password)
}

/// Validate a supplied name; the API never accepts a blank one.
fn check_name(errors: &mut FieldErrors, raw: &str) -> Option<UserName> {
    if raw.trim().is_empty() {
        errors.add("name", BLANK);
        return None;
    }
    errors.check("name", UserName::new(raw), describe_user)
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/user/create",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
#[post("/user/create")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let CreateUserRequest {
        email,
        password,
        name,
    } = payload.into_inner();
    let mut errors = FieldErrors::new();

    let email = errors.require("email", email).and_then(|raw| {
        let parsed = EmailAddress::parse(&raw).map(|_| raw.clone());
        errors.check("email", parsed, describe_user)
    });
    let password = errors
        .require("password", password)
        .and_then(|raw| check_password(&mut errors, &raw));
    let name = errors
        .require("name", name)
        .and_then(|raw| check_name(&mut errors, &raw));
    errors.finish()?;

    let (Some(email), Some(password), Some(name)) = (email, password, name) else {
        return Err(Error::internal("validated user fields missing"));
    };
    let user = state
        .accounts
        .create_user(&email, Some(password), UserExtraFields::named(name))
        .await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Exchange credentials for an API token.
///
/// Bad credentials and inactive accounts share one message under
/// `non_field_errors`, so callers cannot tell which part was wrong.
#[utoipa::path(
    post,
    path = "/api/user/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createToken",
    security([])
)]
#[post("/user/token")]
pub async fn create_token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let TokenRequest { email, password } = payload.into_inner();
    let mut errors = FieldErrors::new();
    let email = errors.require("email", email);
    let password = errors.require("password", password);
    if email.as_deref().is_some_and(|raw| raw.trim().is_empty()) {
        errors.add("email", BLANK);
    }
    if password.as_deref().is_some_and(str::is_empty) {
        errors.add("password", BLANK);
    }
    errors.finish()?;

    let credentials = LoginCredentials::try_from_parts(
        email.as_deref().unwrap_or_default(),
        password.as_deref().unwrap_or_default(),
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;
    let token = state.accounts.issue_token(&credentials).await?;
    Ok(web::Json(TokenResponse {
        token: token.expose().to_owned(),
    }))
}

/// Profile of the authenticated user.
#[utoipa::path(
    get,
    path = "/api/user/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user/me")]
pub async fn current_user(actor: AuthenticatedUser) -> web::Json<UserResponse> {
    web::Json(UserResponse::from(actor.user()))
}

/// Change the authenticated user's name and/or password.
#[utoipa::path(
    patch,
    path = "/api/user/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[patch("/user/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    actor: AuthenticatedUser,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let UpdateUserRequest { name, password } = payload.into_inner();
    let mut errors = FieldErrors::new();
    let name = match name {
        Some(raw) => check_name(&mut errors, &raw),
        None => None,
    };
    let password = match password {
        Some(raw) => check_password(&mut errors, &raw),
        None => None,
    };
    errors.finish()?;

    let updated = state
        .accounts
        .update_profile(actor.user(), ProfileUpdate { name, password })
        .await?;
    Ok(web::Json(UserResponse::from(&updated)))
}
