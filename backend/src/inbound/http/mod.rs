//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every route lives under `/api`; [`api_scope`] registers them together
//! with the JSON and path extractor error handlers.

pub mod auth;
pub mod error;
pub mod health;
pub mod labels;
pub mod recipes;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// The `/api` scope with every REST handler registered.
///
/// Health probes stay outside this scope so orchestrators can reach them
/// without going through the API prefix.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(users::create_user)
        .service(users::create_token)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(labels::list_tags)
        .service(labels::create_tag)
        .service(labels::list_ingredients)
        .service(labels::create_ingredient)
        .service(recipes::list_recipes)
        .service(recipes::create_recipe)
        .service(recipes::get_recipe)
        .service(recipes::replace_recipe)
        .service(recipes::update_recipe)
        .service(recipes::upload_image)
        .service(recipes::retrieve_image)
}
