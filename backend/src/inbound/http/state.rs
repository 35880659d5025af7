//! Shared HTTP adapter state.
//!
//! Handlers receive this state via `actix_web::web::Data`, so they depend
//! only on the driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LabelCatalog, RecipeBook, UserAccounts};
use crate::domain::{IngredientKind, RecipeImagePath, TagKind};

/// Default upload cap for recipe images: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Accounts and tokens.
    pub accounts: Arc<dyn UserAccounts>,
    /// Tag use-cases.
    pub tags: Arc<dyn LabelCatalog<TagKind>>,
    /// Ingredient use-cases.
    pub ingredients: Arc<dyn LabelCatalog<IngredientKind>>,
    /// Recipe use-cases.
    pub recipes: Arc<dyn RecipeBook>,
}

/// How stored media is exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSettings {
    url: String,
    max_upload_bytes: usize,
}

impl MediaSettings {
    /// Settings publishing files under `url`, accepting uploads up to
    /// `max_upload_bytes`. A trailing `/` is appended to `url` when missing.
    pub fn new(url: impl Into<String>, max_upload_bytes: usize) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        Self {
            url,
            max_upload_bytes,
        }
    }

    /// Public URL of a stored file.
    pub fn url_for(&self, path: &RecipeImagePath) -> String {
        format!("{}{}", self.url, path.as_ref())
    }

    /// Largest accepted upload, in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self::new("/media/", DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn UserAccounts>,
    pub tags: Arc<dyn LabelCatalog<TagKind>>,
    pub ingredients: Arc<dyn LabelCatalog<IngredientKind>>,
    pub recipes: Arc<dyn RecipeBook>,
    pub media: MediaSettings,
}

impl HttpState {
    /// Construct state from the ports bundle and media settings.
    pub fn new(ports: HttpStatePorts, media: MediaSettings) -> Self {
        let HttpStatePorts {
            accounts,
            tags,
            ingredients,
            recipes,
        } = ports;
        Self {
            accounts,
            tags,
            ingredients,
            recipes,
            media,
        }
    }
}
