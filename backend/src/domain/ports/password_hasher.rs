//! Port for one-way password hashing.

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Failures raised while hashing.
    pub enum PasswordHasherError {
        /// The hashing backend rejected the input or its parameters.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// Hashes and verifies passwords. Implementations are CPU bound and
/// synchronous; callers decide whether to offload them.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash of `password`.
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError>;

    /// Whether `candidate` matches `hash`. Unusable or malformed hashes never
    /// match.
    fn verify(&self, candidate: &str, hash: &PasswordHash) -> bool;
}
