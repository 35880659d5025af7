//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`UserAccounts`], [`LabelCatalog`], [`RecipeBook`]) are
//! what inbound adapters call. Driven ports (repositories, the password
//! hasher, media storage) are what services call; each exposes a typed error
//! enum so adapters map their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_token_repository;
mod identity;
mod label_catalog;
mod label_repository;
mod media_storage;
mod password_hasher;
mod recipe_repository;
mod recipes;
mod user_repository;

#[cfg(test)]
pub use auth_token_repository::MockAuthTokenRepository;
pub use auth_token_repository::{AuthTokenPersistenceError, AuthTokenRepository};
#[cfg(test)]
pub use identity::MockUserAccounts;
pub use identity::{ProfileUpdate, UserAccounts};
pub use label_catalog::LabelCatalog;
pub use label_repository::{LabelPersistenceError, LabelRepository};
#[cfg(test)]
pub use media_storage::MockMediaStorage;
pub use media_storage::{MediaStorage, MediaStorageError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{ImageSwap, RecipePersistenceError, RecipeRepository};
#[cfg(test)]
pub use recipes::MockRecipeBook;
pub use recipes::RecipeBook;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    NewUserRecord, ProfileChanges, StoredCredentials, UserPersistenceError, UserRepository,
};
