//! Builders wiring the domain services over their adapters.
//!
//! With a database pool every port is backed by Diesel; without one the
//! in-memory stores stand in, which suits local runs and smoke tests.

use std::io;
use std::sync::Arc;

use actix_web::web;

use recipe_backend::domain::ports::{
    AuthTokenRepository, LabelRepository, MediaStorage, PasswordHasher, RecipeRepository,
    UserRepository,
};
use recipe_backend::domain::{
    IdentityService, IngredientKind, LabelService, RecipeService, TagKind,
};
use recipe_backend::inbound::http::state::{HttpState, HttpStatePorts};
use recipe_backend::outbound::memory::{
    InMemoryAuthTokenRepository, InMemoryIngredientRepository, InMemoryRecipeRepository,
    InMemoryTagRepository, InMemoryUserRepository,
};
use recipe_backend::outbound::persistence::{
    DbPool, DieselAuthTokenRepository, DieselIngredientRepository, DieselRecipeRepository,
    DieselTagRepository, DieselUserRepository,
};
use recipe_backend::outbound::security::Argon2PasswordHasher;
use recipe_backend::outbound::storage::CapStdMediaStorage;
use tracing::{info, warn};

use super::ServerConfig;

/// Outbound adapters shared by the services.
struct Adapters<U, T, G, I, R, H, M> {
    users: Arc<U>,
    tokens: Arc<T>,
    tags: Arc<G>,
    ingredients: Arc<I>,
    recipes: Arc<R>,
    hasher: Arc<H>,
    media: Arc<M>,
}

/// Build the services over `adapters` and erase them behind the ports.
fn compose_ports<U, T, G, I, R, H, M>(adapters: Adapters<U, T, G, I, R, H, M>) -> HttpStatePorts
where
    U: UserRepository + 'static,
    T: AuthTokenRepository + 'static,
    G: LabelRepository<TagKind> + 'static,
    I: LabelRepository<IngredientKind> + 'static,
    R: RecipeRepository + 'static,
    H: PasswordHasher + 'static,
    M: MediaStorage + 'static,
{
    let Adapters {
        users,
        tokens,
        tags,
        ingredients,
        recipes,
        hasher,
        media,
    } = adapters;
    HttpStatePorts {
        accounts: Arc::new(IdentityService::new(users, tokens, hasher)),
        tags: Arc::new(LabelService::<TagKind, _>::new(Arc::clone(&tags))),
        ingredients: Arc::new(LabelService::<IngredientKind, _>::new(Arc::clone(
            &ingredients,
        ))),
        recipes: Arc::new(RecipeService::new(recipes, tags, ingredients, media)),
    }
}

fn diesel_ports(pool: &DbPool, media: Arc<CapStdMediaStorage>) -> HttpStatePorts {
    compose_ports(Adapters {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        tokens: Arc::new(DieselAuthTokenRepository::new(pool.clone())),
        tags: Arc::new(DieselTagRepository::new(pool.clone())),
        ingredients: Arc::new(DieselIngredientRepository::new(pool.clone())),
        recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
        hasher: Arc::new(Argon2PasswordHasher::default()),
        media,
    })
}

fn in_memory_ports(media: Arc<CapStdMediaStorage>) -> HttpStatePorts {
    let tags = Arc::new(InMemoryTagRepository::new());
    let ingredients = Arc::new(InMemoryIngredientRepository::new());
    compose_ports(Adapters {
        users: Arc::new(InMemoryUserRepository::new()),
        tokens: Arc::new(InMemoryAuthTokenRepository::new()),
        recipes: Arc::new(InMemoryRecipeRepository::new(
            Arc::clone(&tags),
            Arc::clone(&ingredients),
        )),
        tags,
        ingredients,
        hasher: Arc::new(Argon2PasswordHasher::default()),
        media,
    })
}

/// Build the HTTP state for `config`.
///
/// # Errors
///
/// Returns [`io::Error`] when the media root cannot be opened.
pub(super) fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let media = CapStdMediaStorage::open(&config.media_root).map_err(io::Error::other)?;
    info!(media_root = %media.root_path().display(), "media storage ready");
    let media = Arc::new(media);

    let ports = match &config.db_pool {
        Some(pool) => diesel_ports(pool, media),
        None => {
            warn!("no database configured; data is kept in memory and lost on restart");
            in_memory_ports(media)
        }
    };
    Ok(web::Data::new(HttpState::new(ports, config.media.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_backend::domain::{LabelName, Password, UserExtraFields};
    use recipe_backend::inbound::http::state::MediaSettings;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn db_pool_absent_selects_in_memory_stores() {
        let root = tempfile::tempdir().expect("temp media root");
        let config = ServerConfig::new("127.0.0.1:0".parse().expect("addr"))
            .with_media(root.path().join("media"), MediaSettings::default());

        let state = build_http_state(&config).expect("state builds");

        let user = state
            .accounts
            .create_user(
                "ada@example.com",
                Some(Password::new("testpass123").expect("password")),
                UserExtraFields::default(),
            )
            .await
            .expect("in-memory user store accepts inserts");
        let tag = state
            .tags
            .create(&user, LabelName::new("Vegan").expect("name"))
            .await
            .expect("in-memory tag store accepts inserts");
        assert_eq!(state.tags.list(&user).await.expect("list"), vec![tag]);
        assert!(root.path().join("media").is_dir());
    }

    #[rstest]
    fn unusable_media_root_is_reported() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let config = ServerConfig::new("127.0.0.1:0".parse().expect("addr"))
            .with_media(file.path().join("media"), MediaSettings::default());

        assert!(build_http_state(&config).is_err());
    }
}
