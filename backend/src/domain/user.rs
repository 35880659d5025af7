//! User accounts: identifiers, email addresses and profile fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length, in characters, of an email address or a user name.
pub const USER_FIELD_MAX: usize = 255;

/// Validation errors returned when constructing user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Email was missing or blank once trimmed.
    #[error("users must have an email address")]
    EmptyEmail,
    /// Email lacks a single `@` separating non-empty local and domain parts.
    #[error("enter a valid email address")]
    InvalidEmail,
    /// Email exceeds [`USER_FIELD_MAX`] characters.
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    /// Name exceeds [`USER_FIELD_MAX`] characters.
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
}

/// Database identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw primary key.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw primary key.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Normalised email address used as the login identifier.
///
/// ## Invariants
/// - Trimmed, non-empty, at most [`USER_FIELD_MAX`] characters.
/// - Exactly one `@` separating non-empty local and domain parts, with no
///   whitespace anywhere.
/// - The domain part is lowercase; the local part keeps the caller's case.
///
/// # Examples
/// ```
/// use recipe_backend::domain::EmailAddress;
///
/// let email = EmailAddress::parse("  Ada@EXAMPLE.com ").expect("valid email");
/// assert_eq!(email.as_ref(), "Ada@example.com");
/// assert_eq!(email.lookup_key(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise raw input.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > USER_FIELD_MAX {
            return Err(UserValidationError::EmailTooLong {
                max: USER_FIELD_MAX,
            });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(format!("{local}@{}", domain.to_lowercase())))
    }

    /// Fully lowercased form used for case-insensitive uniqueness and lookup.
    #[must_use]
    pub fn lookup_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form display name. Empty only for accounts created outside the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UserName(String);

impl UserName {
    /// Trim and length-check a name.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() > USER_FIELD_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_FIELD_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional attributes accepted by the user factory besides email and password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserExtraFields {
    /// Display name.
    pub name: UserName,
    /// Inactive accounts cannot log in or use tokens.
    pub is_active: bool,
    /// Staff flag.
    pub is_staff: bool,
    /// Superuser flag.
    pub is_superuser: bool,
}

impl Default for UserExtraFields {
    fn default() -> Self {
        Self {
            name: UserName::default(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }
}

impl UserExtraFields {
    /// Defaults with the given name.
    #[must_use]
    pub fn named(name: UserName) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }
}

/// Persisted user account. The password hash never leaves the identity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    extra: UserExtraFields,
}

impl User {
    /// Assemble a user from stored components.
    #[must_use]
    pub fn new(id: UserId, email: EmailAddress, extra: UserExtraFields) -> Self {
        Self { id, email, extra }
    }

    /// Primary key.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Login email.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.extra.name
    }

    /// Whether the account may authenticate.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.extra.is_active
    }

    /// Staff flag.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.extra.is_staff
    }

    /// Superuser flag.
    #[must_use]
    pub const fn is_superuser(&self) -> bool {
        self.extra.is_superuser
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.email.fmt(f)
    }
}
