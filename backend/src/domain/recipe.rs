//! Recipes and the value types they are built from.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Ingredient, IngredientId, Tag, TagId, UserId};

/// Maximum length, in characters, of a recipe title or link.
pub const RECIPE_TEXT_MAX: usize = 255;

/// Largest representable price (`NUMERIC(5,2)`).
pub const PRICE_MAX: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);

/// Digits kept after the decimal point.
pub const PRICE_SCALE: u32 = 2;

/// Validation errors raised while building recipe value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeValidationError {
    /// Title was blank once trimmed.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title or link exceeds [`RECIPE_TEXT_MAX`] characters.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    /// Preparation time was negative.
    #[error("time_minutes must not be negative")]
    NegativeTime,
    /// Price below zero.
    #[error("price must not be negative")]
    NegativePrice,
    /// Price has more than [`PRICE_SCALE`] fractional digits.
    #[error("price must have at most {PRICE_SCALE} decimal places")]
    PriceScale,
    /// Price above [`PRICE_MAX`].
    #[error("price must be at most {PRICE_MAX}")]
    PriceTooLarge,
}

/// Database identifier of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(i64);

impl RecipeId {
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

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn check_length(field: &'static str, value: &str) -> Result<(), RecipeValidationError> {
    if value.chars().count() > RECIPE_TEXT_MAX {
        return Err(RecipeValidationError::TooLong {
            field,
            max: RECIPE_TEXT_MAX,
        });
    }
    Ok(())
}

/// Trimmed, non-empty recipe title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeTitle(String);

impl RecipeTitle {
    /// Validate a raw title.
    pub fn new(raw: &str) -> Result<Self, RecipeValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RecipeValidationError::EmptyTitle);
        }
        check_length("title", trimmed)?;
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RecipeTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecipeTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-negative preparation time in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeMinutes(i32);

impl TimeMinutes {
    /// Validate a raw minute count.
    pub fn new(raw: i32) -> Result<Self, RecipeValidationError> {
        if raw < 0 {
            return Err(RecipeValidationError::NegativeTime);
        }
        Ok(Self(raw))
    }

    /// Minutes.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Recipe price in the range `0.00..=999.99`, always held at scale 2.
///
/// # Examples
/// ```
/// use recipe_backend::domain::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(5, 0)).unwrap();
/// assert_eq!(price.to_string(), "5.00");
/// assert!(Price::new(Decimal::new(1234, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price(Decimal);

impl Price {
    /// Validate and rescale a decimal amount.
    pub fn new(raw: Decimal) -> Result<Self, RecipeValidationError> {
        if raw.is_sign_negative() && !raw.is_zero() {
            return Err(RecipeValidationError::NegativePrice);
        }
        let mut value = raw.normalize();
        if value.scale() > PRICE_SCALE {
            return Err(RecipeValidationError::PriceScale);
        }
        if value > PRICE_MAX {
            return Err(RecipeValidationError::PriceTooLarge);
        }
        value.set_sign_positive(true);
        value.rescale(PRICE_SCALE);
        Ok(Self(value))
    }

    /// Underlying decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Optional external link; empty means "none".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeLink(String);

impl RecipeLink {
    /// Validate a raw link.
    pub fn new(raw: &str) -> Result<Self, RecipeValidationError> {
        let trimmed = raw.trim();
        check_length("link", trimmed)?;
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RecipeLink {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Media-root-relative path of a stored recipe image, e.g.
/// `uploads/recipe/<uuid>.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeImagePath(String);

impl RecipeImagePath {
    /// Wrap a stored relative path.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl AsRef<str> for RecipeImagePath {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecipeImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scalar recipe fields shared by drafts and stored recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    /// Title.
    pub title: RecipeTitle,
    /// Preparation time.
    pub time_minutes: TimeMinutes,
    /// Price.
    pub price: Price,
    /// External link, possibly empty.
    pub link: RecipeLink,
}

/// Complete recipe content used for creation and full replacement.
///
/// Relation lists are de-duplicated by the service before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    /// Scalar fields.
    pub fields: RecipeFields,
    /// Attached tags.
    pub tags: Vec<TagId>,
    /// Attached ingredients.
    pub ingredients: Vec<IngredientId>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    /// New title.
    pub title: Option<RecipeTitle>,
    /// New preparation time.
    pub time_minutes: Option<TimeMinutes>,
    /// New price.
    pub price: Option<Price>,
    /// New link.
    pub link: Option<RecipeLink>,
    /// Replacement tag set.
    pub tags: Option<Vec<TagId>>,
    /// Replacement ingredient set.
    pub ingredients: Option<Vec<IngredientId>>,
}

impl RecipePatch {
    /// Merge the patch over a stored recipe, yielding the full new content.
    pub fn apply_to(self, current: &Recipe) -> RecipeDraft {
        RecipeDraft {
            fields: RecipeFields {
                title: self.title.unwrap_or_else(|| current.fields.title.clone()),
                time_minutes: self.time_minutes.unwrap_or(current.fields.time_minutes),
                price: self.price.unwrap_or(current.fields.price),
                link: self.link.unwrap_or_else(|| current.fields.link.clone()),
            },
            tags: self
                .tags
                .unwrap_or_else(|| current.tags.iter().map(Tag::id).collect()),
            ingredients: self
                .ingredients
                .unwrap_or_else(|| current.ingredients.iter().map(Ingredient::id).collect()),
        }
    }
}

/// A stored recipe with its relations resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Primary key.
    pub id: RecipeId,
    /// Owning user.
    pub owner: UserId,
    /// Scalar fields.
    pub fields: RecipeFields,
    /// Attached tags, ordered by id.
    pub tags: Vec<Tag>,
    /// Attached ingredients, ordered by id.
    pub ingredients: Vec<Ingredient>,
    /// Uploaded image, if any.
    pub image: Option<RecipeImagePath>,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fields.title.fmt(f)
    }
}
