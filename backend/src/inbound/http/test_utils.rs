//! Test helpers for inbound HTTP components.
//!
//! [`TestContext`] wires the real services over the in-memory stores, a
//! cheap Argon2 configuration and a temporary media root, so handler tests
//! exercise the whole request path without a database.

use std::path::Path;
use std::sync::Arc;

use actix_http::Request;
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName};
use actix_web::{App, test, web};
use argon2::Params;
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::Trace;
use crate::domain::{IdentityService, IngredientKind, LabelService, RecipeService, TagKind};
use crate::inbound::http::api_scope;
use crate::inbound::http::state::{HttpState, HttpStatePorts, MediaSettings};
use crate::outbound::memory::{
    InMemoryAuthTokenRepository, InMemoryIngredientRepository, InMemoryRecipeRepository,
    InMemoryTagRepository, InMemoryUserRepository,
};
use crate::outbound::security::Argon2PasswordHasher;
use crate::outbound::storage::CapStdMediaStorage;

/// Password used by [`sign_up`].
pub const TEST_PASSWORD: &str = "testpass123";

/// Boundary used by [`multipart_body`].
const BOUNDARY: &str = "recipe-test-boundary";

/// In-memory application state plus the temporary media root backing it.
pub struct TestContext {
    pub state: web::Data<HttpState>,
    media_root: TempDir,
}

impl TestContext {
    /// Fresh, empty state with default media settings.
    pub fn new() -> Self {
        Self::with_media(MediaSettings::default())
    }

    /// Fresh, empty state with the given media settings.
    pub fn with_media(settings: MediaSettings) -> Self {
        let media_root = TempDir::new().expect("temporary media root");
        let media =
            Arc::new(CapStdMediaStorage::open(media_root.path()).expect("open media root"));
        let params = Params::new(8, 1, 1, None).expect("cheap argon2 params");

        let users = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(InMemoryAuthTokenRepository::new());
        let tags = Arc::new(InMemoryTagRepository::new());
        let ingredients = Arc::new(InMemoryIngredientRepository::new());
        let recipes = Arc::new(InMemoryRecipeRepository::new(
            Arc::clone(&tags),
            Arc::clone(&ingredients),
        ));

        let ports = HttpStatePorts {
            accounts: Arc::new(IdentityService::new(
                users,
                tokens,
                Arc::new(Argon2PasswordHasher::new(params)),
            )),
            tags: Arc::new(LabelService::<TagKind, _>::new(Arc::clone(&tags))),
            ingredients: Arc::new(LabelService::<IngredientKind, _>::new(Arc::clone(
                &ingredients,
            ))),
            recipes: Arc::new(RecipeService::new(recipes, tags, ingredients, media)),
        };

        Self {
            state: web::Data::new(HttpState::new(ports, settings)),
            media_root,
        }
    }

    /// Directory holding uploaded files.
    pub fn media_root(&self) -> &Path {
        self.media_root.path()
    }

    /// Initialise the full `/api` application over this state.
    pub async fn init(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
        test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(Trace)
                .service(api_scope()),
        )
        .await
    }
}

/// `Authorization` header value for `token`.
pub fn token_header(token: &str) -> (HeaderName, String) {
    (AUTHORIZATION, format!("Token {token}"))
}

/// Register `email` with [`TEST_PASSWORD`] and return a fresh API token.
pub async fn sign_up<S, B>(app: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let create = test::TestRequest::post()
        .uri("/api/user/create")
        .set_json(json!({"email": email, "password": TEST_PASSWORD, "name": "Test Name"}))
        .to_request();
    let res = test::call_service(app, create).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let login = test::TestRequest::post()
        .uri("/api/user/token")
        .set_json(json!({"email": email, "password": TEST_PASSWORD}))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, login).await;
    body["token"].as_str().expect("token in body").to_owned()
}

/// Authenticated JSON request helper returning status and parsed body.
pub async fn send_json<S, B>(
    app: &S,
    request: test::TestRequest,
    token: &str,
) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = request.insert_header(token_header(token)).to_request();
    let res = test::call_service(app, request).await;
    let status = res.status();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

/// A `multipart/form-data` body with a single file field.
pub fn multipart_body(
    field: &str,
    filename: &str,
    bytes: &[u8],
) -> ((HeaderName, String), Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (
        (CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")),
        body,
    )
}
