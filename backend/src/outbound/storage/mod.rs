//! Media file storage adapters.

mod cap_std_media_storage;

pub use cap_std_media_storage::CapStdMediaStorage;
