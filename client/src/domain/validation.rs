//! Form validation rules.
//!
//! Pure, synchronous checks applied before any write reaches a backend. Every
//! applicable rule runs and all violations are reported together, keyed by
//! the form field name — never just the first failure, and never a panic for
//! well-formed input types.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::domain::account::PASSWORD_MIN;
use crate::domain::error::Error;
use crate::domain::recipe::RecipeDraft;
use crate::domain::{AccountValidationError, EmailAddress};

/// Minimum title length in characters.
pub const TITLE_MIN: usize = 3;
/// Minimum description length in characters.
pub const DESCRIPTION_MIN: usize = 10;

/// Violation message for a missing title.
pub const TITLE_REQUIRED: &str = "Title is required";
/// Violation message for a too-short title.
pub const TITLE_TOO_SHORT: &str = "Title must be at least 3 characters";
/// Violation message for a missing description.
pub const DESCRIPTION_REQUIRED: &str = "Description is required";
/// Violation message for a too-short description.
pub const DESCRIPTION_TOO_SHORT: &str = "Description must be at least 10 characters";
/// Violation message for missing ingredients.
pub const INGREDIENTS_REQUIRED: &str = "Ingredients are required";
/// Violation message for missing instructions.
pub const INSTRUCTIONS_REQUIRED: &str = "Instructions are required";
/// Violation message for a missing preparation time.
pub const PREP_TIME_REQUIRED: &str = "Preparation time is required";
/// Violation message for a missing cooking time.
pub const COOK_TIME_REQUIRED: &str = "Cooking time is required";
/// Violation message for a non-positive timing value.
pub const TIME_NOT_POSITIVE: &str = "Must be a positive number";
/// Violation message for a missing category.
pub const CATEGORY_REQUIRED: &str = "Category is required";
/// Violation message for a malformed email address.
pub const EMAIL_INVALID: &str = "Invalid email address";
/// Violation message for a missing email address.
pub const EMAIL_REQUIRED: &str = "Email is required";
/// Violation message for a too-short password.
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
/// Violation message for a missing password.
pub const PASSWORD_REQUIRED: &str = "Password is required";
/// Violation message for a confirmation that differs from the password.
pub const CONFIRM_MISMATCH: &str = "Passwords must match";
/// Violation message for a missing confirmation.
pub const CONFIRM_REQUIRED: &str = "Confirm Password is required";

/// Carried on [`Error`] when a write is rejected for invalid fields.
pub const VALIDATION_FAILED_MESSAGE: &str = "One or more fields are invalid.";

/// Field-keyed violation messages, one message per failing field.
///
/// Keys are the form field names (`title`, `prepTime`, `confirmPassword`,
/// ...), ordered for stable reporting. An empty set means the input is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(BTreeMap<String, String>);

impl Violations {
    /// Empty violation set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation for a field, keeping the first message per field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Whether the input passed every rule.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message recorded for a field, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Iterate violations in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise the violations as the error.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl From<Violations> for Error {
    fn from(violations: Violations) -> Self {
        let details = Value::Object(
            violations
                .iter()
                .map(|(field, message)| (field.to_owned(), Value::String(message.to_owned())))
                .collect(),
        );
        Error::validation_failed(VALIDATION_FAILED_MESSAGE).with_details(details)
    }
}

/// A positive minutes value that fits the stored representation, if any.
pub(crate) fn positive_minutes(value: Option<i64>) -> Option<u32> {
    value
        .filter(|minutes| *minutes > 0)
        .and_then(|minutes| u32::try_from(minutes).ok())
}

fn require_text(violations: &mut Violations, field: &'static str, value: &str, message: &'static str) {
    if value.trim().is_empty() {
        violations.add(field, message);
    }
}

fn require_min_chars(
    violations: &mut Violations,
    field: &'static str,
    value: &str,
    min: usize,
    message: &'static str,
) {
    if !value.trim().is_empty() && value.chars().count() < min {
        violations.add(field, message);
    }
}

fn require_positive_minutes(
    violations: &mut Violations,
    field: &'static str,
    value: Option<i64>,
    required_message: &'static str,
) {
    match value {
        None => violations.add(field, required_message),
        Some(_) if positive_minutes(value).is_none() => violations.add(field, TIME_NOT_POSITIVE),
        Some(_) => {}
    }
}

fn check_email(violations: &mut Violations, email: &str) {
    match EmailAddress::new(email) {
        Ok(_) => {}
        Err(AccountValidationError::EmptyEmail) => violations.add("email", EMAIL_REQUIRED),
        Err(_) => violations.add("email", EMAIL_INVALID),
    }
}

fn check_password(violations: &mut Violations, password: &str) {
    if password.is_empty() {
        violations.add("password", PASSWORD_REQUIRED);
    } else if password.chars().count() < PASSWORD_MIN {
        violations.add("password", PASSWORD_TOO_SHORT);
    }
}

/// Check a recipe draft against every field rule.
///
/// # Examples
/// ```
/// use client::domain::RecipeDraft;
/// use client::domain::validation::{validate_recipe_draft, TITLE_REQUIRED};
///
/// let violations = validate_recipe_draft(&RecipeDraft::default());
/// assert_eq!(violations.get("title"), Some(TITLE_REQUIRED));
/// ```
pub fn validate_recipe_draft(draft: &RecipeDraft) -> Violations {
    let mut violations = Violations::new();

    require_text(&mut violations, "title", &draft.title, TITLE_REQUIRED);
    require_min_chars(
        &mut violations,
        "title",
        &draft.title,
        TITLE_MIN,
        TITLE_TOO_SHORT,
    );

    require_text(
        &mut violations,
        "description",
        &draft.description,
        DESCRIPTION_REQUIRED,
    );
    require_min_chars(
        &mut violations,
        "description",
        &draft.description,
        DESCRIPTION_MIN,
        DESCRIPTION_TOO_SHORT,
    );

    require_text(
        &mut violations,
        "ingredients",
        &draft.ingredients,
        INGREDIENTS_REQUIRED,
    );
    require_text(
        &mut violations,
        "instructions",
        &draft.instructions,
        INSTRUCTIONS_REQUIRED,
    );

    require_positive_minutes(
        &mut violations,
        "prepTime",
        draft.prep_time_minutes,
        PREP_TIME_REQUIRED,
    );
    require_positive_minutes(
        &mut violations,
        "cookTime",
        draft.cook_time_minutes,
        COOK_TIME_REQUIRED,
    );

    if draft.category.is_none() {
        violations.add("category", CATEGORY_REQUIRED);
    }

    violations
}

/// Check the login form fields.
pub fn validate_login(email: &str, password: &str) -> Violations {
    let mut violations = Violations::new();
    check_email(&mut violations, email);
    check_password(&mut violations, password);
    violations
}

/// Check the registration form fields, including confirmation equality.
pub fn validate_registration(email: &str, password: &str, confirm_password: &str) -> Violations {
    let mut violations = validate_login(email, password);
    if confirm_password.is_empty() {
        violations.add("confirmPassword", CONFIRM_REQUIRED);
    } else if confirm_password != password {
        violations.add("confirmPassword", CONFIRM_MISMATCH);
    }
    violations
}
