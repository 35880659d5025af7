//! [`MediaStorage`] over a capability-scoped media root.
//!
//! All paths resolve inside the root `Dir`; `cap-std` rejects `..` and
//! absolute components, so a stored path can never escape the media root.
//! Files are staged under a temporary name and renamed into place.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::RecipeImagePath;
use crate::domain::ports::{MediaStorage, MediaStorageError};

/// Media storage rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct CapStdMediaStorage {
    root: Arc<Dir>,
    root_path: PathBuf,
}

fn io_error(path: &Path, error: &io::Error) -> MediaStorageError {
    MediaStorageError::io(format!("{}: {error}", path.display()))
}

impl CapStdMediaStorage {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`MediaStorageError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, MediaStorageError> {
        let root_path = root.into();
        Dir::create_ambient_dir_all(&root_path, ambient_authority())
            .map_err(|err| io_error(&root_path, &err))?;
        let dir = Dir::open_ambient_dir(&root_path, ambient_authority())
            .map_err(|err| io_error(&root_path, &err))?;
        Ok(Self {
            root: Arc::new(dir),
            root_path,
        })
    }

    /// Filesystem location of the media root.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    async fn run<T, F>(&self, op: F) -> Result<T, MediaStorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, MediaStorageError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|err| MediaStorageError::io(format!("storage task failed: {err}")))?
    }
}

fn write_staged(dir: &Dir, relative: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = relative.parent().filter(|p| !p.as_os_str().is_empty()) {
        dir.create_dir_all(parent)?;
    }
    let staged = relative.with_file_name(format!(".tmp-{}", Uuid::new_v4().simple()));
    dir.write(&staged, bytes)?;
    dir.rename(&staged, dir, relative).inspect_err(|_| {
        let _cleanup = dir.remove_file(&staged);
    })
}

fn remove_if_exists(dir: &Dir, relative: &Path) -> io::Result<()> {
    match dir.remove_file(relative) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

#[async_trait]
impl MediaStorage for CapStdMediaStorage {
    async fn save(&self, path: &RecipeImagePath, bytes: &[u8]) -> Result<(), MediaStorageError> {
        let relative = PathBuf::from(path.as_ref());
        let payload = bytes.to_vec();
        let size = payload.len();
        self.run(move |dir| {
            write_staged(dir, &relative, &payload).map_err(|err| io_error(&relative, &err))
        })
        .await?;
        debug!(path = %path, size, "stored media file");
        Ok(())
    }

    async fn remove(&self, path: &RecipeImagePath) -> Result<(), MediaStorageError> {
        let relative = PathBuf::from(path.as_ref());
        self.run(move |dir| remove_if_exists(dir, &relative).map_err(|err| io_error(&relative, &err)))
            .await?;
        debug!(path = %path, "removed media file");
        Ok(())
    }
}
