//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use recipe_backend::inbound::http::state::MediaSettings;
use recipe_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) media_root: PathBuf,
    pub(crate) media: MediaSettings,
}

impl ServerConfig {
    /// Configuration listening on `bind_addr` with in-memory stores and
    /// media kept under `./media`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            media_root: PathBuf::from("media"),
            media: MediaSettings::default(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, every repository port is backed by PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Store uploads under `root` and publish them per `media`.
    #[must_use]
    pub fn with_media(mut self, root: impl Into<PathBuf>, media: MediaSettings) -> Self {
        self.media_root = root.into();
        self.media = media;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
