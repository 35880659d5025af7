//! Token authentication for HTTP handlers.
//!
//! [`AuthenticatedUser`] reads `Authorization: Token <key>` (or `Bearer`),
//! resolves the key through [`UserAccounts`](crate::domain::ports::UserAccounts)
//! and hands the acting user to the handler. Anything else is a 401 before
//! the handler runs.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AuthToken, Error, User};

use super::state::HttpState;

const SCHEMES: [&str; 2] = ["Token", "Bearer"];

/// The user resolved from the request's API token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    /// The acting user.
    pub fn user(&self) -> &User {
        &self.0
    }
}

/// Extract the token from an `Authorization` header value.
fn parse_header(value: &str) -> Result<AuthToken, Error> {
    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or_default();
    if !SCHEMES.iter().any(|known| known.eq_ignore_ascii_case(scheme)) {
        return Err(missing_credentials());
    }
    let (Some(key), None) = (parts.next(), parts.next()) else {
        return Err(Error::unauthorized(
            "Invalid token header. Token string should not contain spaces.",
        ));
    };
    AuthToken::parse(key).ok_or_else(|| Error::unauthorized("Invalid token."))
}

fn missing_credentials() -> Error {
    Error::unauthorized("Authentication credentials were not provided.")
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .map(|value| value.to_str().map(str::to_owned));

        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            let raw = match header {
                None => return Err(missing_credentials()),
                Some(Err(_)) => {
                    return Err(Error::unauthorized(
                        "Invalid token header. Token string should not contain invalid characters.",
                    ));
                }
                Some(Ok(raw)) => raw,
            };
            let token = parse_header(&raw)?;
            state.accounts.resolve_token(&token).await.map(Self)
        })
    }
}
