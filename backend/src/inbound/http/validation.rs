//! Field-keyed validation errors for request bodies.
//!
//! Handlers validate every field before answering so a client sees all
//! problems in one response: `{"title": ["This field is required."], ...}`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::domain::{
    Error, LabelValidationError, PasswordValidationError, RecipeValidationError,
    UserValidationError,
};

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const BLANK: &str = "This field may not be blank.";

/// Accumulates messages per field.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Keep the `Ok` value, recording the error under `field` otherwise.
    pub(crate) fn check<T, E>(
        &mut self,
        field: &str,
        result: Result<T, E>,
        describe: impl FnOnce(&E) -> String,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(field, describe(&err));
                None
            }
        }
    }

    /// Require a value, recording [`REQUIRED`] when absent.
    pub(crate) fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
        value
    }

    /// `Ok(())` when nothing was recorded, else a 400 carrying all messages.
    pub(crate) fn finish(self) -> Result<(), Error> {
        let Some(first) = self.0.values().flatten().next().cloned() else {
            return Ok(());
        };
        let details: Map<String, Value> = self
            .0
            .into_iter()
            .map(|(field, messages)| {
                let list = messages.into_iter().map(Value::String).collect();
                (field, Value::Array(list))
            })
            .collect();
        Err(Error::invalid_request(first).with_details(Value::Object(details)))
    }
}

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

pub(crate) fn describe_user(err: &UserValidationError) -> String {
    match err {
        UserValidationError::EmptyEmail => BLANK.to_owned(),
        UserValidationError::InvalidEmail => "Enter a valid email address.".to_owned(),
        UserValidationError::EmailTooLong { max } | UserValidationError::NameTooLong { max } => {
            too_long(*max)
        }
    }
}

pub(crate) fn describe_password(err: &PasswordValidationError) -> String {
    match err {
        PasswordValidationError::TooShort { min } => {
            format!("Ensure this field has at least {min} characters.")
        }
    }
}

pub(crate) fn describe_label(err: &LabelValidationError) -> String {
    match err {
        LabelValidationError::EmptyName => BLANK.to_owned(),
        LabelValidationError::NameTooLong { max } => too_long(*max),
    }
}

pub(crate) fn describe_recipe(err: &RecipeValidationError) -> String {
    match err {
        RecipeValidationError::EmptyTitle => BLANK.to_owned(),
        RecipeValidationError::TooLong { max, .. } => too_long(*max),
        RecipeValidationError::NegativeTime => {
            "Ensure this value is greater than or equal to 0.".to_owned()
        }
        RecipeValidationError::NegativePrice => {
            "Ensure this value is greater than or equal to 0.00.".to_owned()
        }
        RecipeValidationError::PriceScale => {
            "Ensure that there are no more than 2 decimal places.".to_owned()
        }
        RecipeValidationError::PriceTooLarge => {
            "Ensure that there are no more than 5 digits in total.".to_owned()
        }
    }
}
