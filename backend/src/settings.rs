//! Server configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `RECIPE_*` environment variables and an
//! optional configuration file, in that order of precedence.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::inbound::http::state::{DEFAULT_MAX_UPLOAD_BYTES, MediaSettings};

const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_MEDIA_URL: &str = "/media/";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Runtime settings for the recipe backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPE")]
pub struct ServerSettings {
    /// Interface to listen on.
    pub bind_host: Option<String>,
    /// Port to listen on.
    #[ortho_config(default = 8000)]
    pub bind_port: u16,
    /// PostgreSQL URL. Without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Directory receiving uploaded media.
    pub media_root: Option<PathBuf>,
    /// Public URL prefix under which `media_root` is served.
    pub media_url: Option<String>,
    /// Largest accepted image upload, in bytes.
    pub max_upload_bytes: Option<usize>,
}

impl ServerSettings {
    /// Address to bind; the host falls back to `0.0.0.0`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured host is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let host = self.bind_host.as_deref().unwrap_or(DEFAULT_BIND_HOST);
        format!("{host}:{}", self.bind_port).parse()
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size cap.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Media directory, falling back to `./media`.
    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    /// Media URL prefix and upload limit for the HTTP layer.
    pub fn media(&self) -> MediaSettings {
        MediaSettings::new(
            self.media_url.as_deref().unwrap_or(DEFAULT_MEDIA_URL),
            self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        )
    }
}
