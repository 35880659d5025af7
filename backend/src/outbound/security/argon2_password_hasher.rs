//! Argon2id implementation of the [`PasswordHasher`] port.
//!
//! Hashes are stored as PHC strings, so the parameters travel with each hash
//! and verification keeps working after the cost settings change.

use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{Password, PasswordHash};

const SALT_BYTES: usize = 16;

/// Argon2id hasher with configurable cost parameters.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl Argon2PasswordHasher {
    /// Hasher using the given Argon2 cost parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    fn engine(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        let mut salt_bytes = [0_u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;

        self.engine()
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|phc| PasswordHash::from_stored(phc.to_string()))
            .map_err(|err| PasswordHasherError::hash(err.to_string()))
    }

    fn verify(&self, candidate: &str, hash: &PasswordHash) -> bool {
        if !hash.is_usable() {
            return false;
        }
        let Ok(parsed) = PhcString::new(hash.as_ref()) else {
            return false;
        };
        self.engine()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}
