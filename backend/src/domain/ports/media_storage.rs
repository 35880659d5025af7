//! Port for storing uploaded media files.
use async_trait::async_trait;

use crate::domain::RecipeImagePath;

use super::define_port_error;

define_port_error! {
    /// Failures raised by media storage adapters.
    pub enum MediaStorageError {
        /// Reading or writing the backing store failed.
        Io { message: String } => "media storage failed: {message}",
    }
}

/// File store addressed by media-root-relative paths.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Write `bytes` at `path`, creating parent directories.
    async fn save(&self, path: &RecipeImagePath, bytes: &[u8]) -> Result<(), MediaStorageError>;

    /// Delete the file at `path`. A missing file is not an error.
    async fn remove(&self, path: &RecipeImagePath) -> Result<(), MediaStorageError>;
}
