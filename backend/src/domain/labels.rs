//! Owner-scoped labels attached to recipes: tags and ingredients.
//!
//! Both share one shape (an id, a name and an owning user), so they are a
//! single generic [`Label`] parameterised by a zero-sized [`LabelKind`]
//! marker. The marker keeps tag and ingredient ids from being mixed up.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::UserId;

/// Maximum length, in characters, of a label name.
pub const LABEL_NAME_MAX: usize = 255;

/// Marker trait distinguishing label families.
pub trait LabelKind: Send + Sync + 'static {
    /// Singular noun used in log fields and messages.
    const NOUN: &'static str;
}

/// Tag marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {}

impl LabelKind for TagKind {
    const NOUN: &'static str = "tag";
}

/// Ingredient marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngredientKind {}

impl LabelKind for IngredientKind {
    const NOUN: &'static str = "ingredient";
}

/// Database identifier of a label of kind `K`.
pub struct LabelId<K: LabelKind> {
    raw: i64,
    kind: PhantomData<fn() -> K>,
}

impl<K: LabelKind> LabelId<K> {
    /// Wrap a raw primary key.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self {
            raw,
            kind: PhantomData,
        }
    }

    /// Raw primary key.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.raw
    }
}

// Manual impls: derives would demand the same traits of the marker.
impl<K: LabelKind> Clone for LabelId<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: LabelKind> Copy for LabelId<K> {}

impl<K: LabelKind> PartialEq for LabelId<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K: LabelKind> Eq for LabelId<K> {}

impl<K: LabelKind> PartialOrd for LabelId<K> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: LabelKind> Ord for LabelId<K> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<K: LabelKind> Hash for LabelId<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K: LabelKind> fmt::Debug for LabelId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Id({})", K::NOUN, self.raw)
    }
}

impl<K: LabelKind> fmt::Display for LabelId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

impl<K: LabelKind> Serialize for LabelId<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.raw)
    }
}

impl<'de, K: LabelKind> Deserialize<'de> for LabelId<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::new)
    }
}

/// Validation errors for label names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelValidationError {
    /// Name was blank once trimmed.
    #[error("name must not be empty")]
    EmptyName,
    /// Name exceeds [`LABEL_NAME_MAX`] characters.
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
}

/// Trimmed, non-empty label name.
///
/// # Examples
/// ```
/// use recipe_backend::domain::LabelName;
///
/// assert_eq!(LabelName::new("  Vegan ").unwrap().as_ref(), "Vegan");
/// assert!(LabelName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelName(String);

impl LabelName {
    /// Validate a raw name.
    pub fn new(raw: &str) -> Result<Self, LabelValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LabelValidationError::EmptyName);
        }
        if trimmed.chars().count() > LABEL_NAME_MAX {
            return Err(LabelValidationError::NameTooLong {
                max: LABEL_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for LabelName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted label owned by one user.
pub struct Label<K: LabelKind> {
    id: LabelId<K>,
    name: LabelName,
    owner: UserId,
}

/// Recipe tag.
pub type Tag = Label<TagKind>;
/// Recipe ingredient.
pub type Ingredient = Label<IngredientKind>;
/// Tag identifier.
pub type TagId = LabelId<TagKind>;
/// Ingredient identifier.
pub type IngredientId = LabelId<IngredientKind>;

impl<K: LabelKind> Label<K> {
    /// Assemble a label from stored components.
    #[must_use]
    pub fn new(id: LabelId<K>, name: LabelName, owner: UserId) -> Self {
        Self { id, name, owner }
    }

    /// Primary key.
    #[must_use]
    pub const fn id(&self) -> LabelId<K> {
        self.id
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &LabelName {
        &self.name
    }

    /// Owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }
}

impl<K: LabelKind> Clone for Label<K> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            owner: self.owner,
        }
    }
}

impl<K: LabelKind> PartialEq for Label<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.owner == other.owner
    }
}

impl<K: LabelKind> Eq for Label<K> {}

impl<K: LabelKind> fmt::Debug for Label<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::NOUN)
            .field("id", &self.id.as_i64())
            .field("name", &self.name.as_ref())
            .field("owner", &self.owner)
            .finish()
    }
}

impl<K: LabelKind> fmt::Display for Label<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

/// Sort labels the way list endpoints present them: name descending, then
/// id descending.
pub fn sort_for_listing<K: LabelKind>(labels: &mut [Label<K>]) {
    labels.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
}
