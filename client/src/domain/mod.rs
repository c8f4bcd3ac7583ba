//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed core of the recipe client, keep
//! entities immutable, and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc. Backends are reached only through the
//! traits in [`ports`]; adapters live outside the domain.
//!
//! Public surface:
//! - `Error` / `ErrorCode` — user-facing failure payload and taxonomy.
//! - `Account`, `Credentials` — identity types and validated credentials.
//! - `Recipe` and its building blocks — drafts, validated fields, images.
//! - `SessionService` — observable current identity over a gateway.
//! - `RecipeCommandService` / `RecipeQueryService` — recipe store surface.
//! - `validation` — field-level rule evaluation with verbatim messages.

pub mod error;
pub mod ports;
pub mod validation;

mod account;
mod recipe;
mod recipe_service;
mod session;

pub use self::account::{
    Account, AccountId, AccountValidationError, Credentials, CredentialsValidationError,
    EmailAddress, PASSWORD_MIN,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::recipe::{
    Category, CategoryFilter, ImageSource, ImageUpload, NewRecipe, Recipe, RecipeChanges,
    RecipeDraft, RecipeFields, RecipeId, RecipeValidationError,
};
pub use self::recipe_service::{RecipeCommandService, RecipeQueryService};
pub use self::session::{SessionService, SessionState, SubscriptionId};
pub use self::validation::{
    Violations, validate_login, validate_recipe_draft, validate_registration,
};
