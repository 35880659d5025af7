//! Authentication primitives: passwords, stored hashes, login credentials and
//! API tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use rand::RngCore;
use rand::distributions::{Alphanumeric, DistString};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_LENGTH: usize = 5;

/// Number of random bytes behind each issued token.
const TOKEN_BYTES: usize = 20;

/// Prefix marking a stored hash that can never verify.
const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Domain error returned when a new password is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordValidationError {
    /// Fewer than [`PASSWORD_MIN_LENGTH`] characters.
    #[error("password must have at least {min} characters")]
    TooShort { min: usize },
}

/// Plaintext password accepted for hashing.
///
/// ## Invariants
/// - At least [`PASSWORD_MIN_LENGTH`] characters.
/// - Whitespace is preserved exactly as supplied.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a candidate password.
    pub fn new(raw: &str) -> Result<Self, PasswordValidationError> {
        if raw.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(PasswordValidationError::TooShort {
                min: PASSWORD_MIN_LENGTH,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plaintext, for handing to a hasher.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// Stored one-way password hash.
///
/// Either a PHC string produced by a [`crate::domain::ports::PasswordHasher`]
/// or an unusable marker that no password verifies against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a stored hash string.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Marker for accounts created without a password.
    #[must_use]
    pub fn unusable() -> Self {
        let suffix = Alphanumeric.sample_string(&mut rand::thread_rng(), 40);
        Self(format!("{UNUSABLE_PASSWORD_PREFIX}{suffix}"))
    }

    /// `false` for the unusable marker.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.0.starts_with(UNUSABLE_PASSWORD_PREFIX)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use recipe_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com ", "secret").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email string suitable for user lookups.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Plaintext API token handed to clients exactly once.
///
/// Tokens are 40 lowercase hex characters. Only the [`TokenDigest`] is
/// persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Draw a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; TOKEN_BYTES]);
        rand::thread_rng().fill_bytes(&mut bytes[..]);
        Self(Zeroizing::new(hex::encode(&bytes[..])))
    }

    /// Accept a client-supplied token if it has the issued shape.
    pub fn parse(raw: &str) -> Option<Self> {
        let well_formed = raw.len() == TOKEN_BYTES * 2
            && raw.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plaintext, for the token response body.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// SHA-256 digest used as the storage key.
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        TokenDigest(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(**redacted**)")
    }
}

/// Hex-encoded SHA-256 digest of an [`AuthToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Wrap a stored digest.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl AsRef<str> for TokenDigest {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
