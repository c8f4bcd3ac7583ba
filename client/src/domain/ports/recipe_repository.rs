//! Port for the injected recipe document backend.

use async_trait::async_trait;

use crate::domain::{AccountId, NewRecipe, Recipe, RecipeChanges, RecipeId};

/// Errors raised by recipe repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeRepositoryError {
    /// The request never reached the backend.
    #[error("document backend unreachable: {message}")]
    Unreachable {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// The backend processed the request and refused it.
    #[error("document backend rejected the request: {message}")]
    Rejected {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl RecipeRepositoryError {
    /// Construct a [`RecipeRepositoryError::Unreachable`] error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Construct a [`RecipeRepositoryError::Rejected`] error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Port for recipe document reads and writes.
///
/// Result ordering is backend-determined; `list_by_owner` makes no ordering
/// promise. `update` reports whether the document existed; `delete` is
/// idempotent and succeeds for already-absent documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert a record and return the backend-assigned identifier.
    async fn insert(&self, record: &NewRecipe) -> Result<RecipeId, RecipeRepositoryError>;

    /// Fetch a recipe by identifier.
    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// Fetch every recipe belonging to the owner.
    async fn list_by_owner(&self, owner_id: &AccountId)
    -> Result<Vec<Recipe>, RecipeRepositoryError>;

    /// Replace the updatable field set; `false` when no such document exists.
    async fn update(
        &self,
        id: &RecipeId,
        changes: &RecipeChanges,
    ) -> Result<bool, RecipeRepositoryError>;

    /// Remove the document if present.
    async fn delete(&self, id: &RecipeId) -> Result<(), RecipeRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRecipeRepository;

#[async_trait]
impl RecipeRepository for FixtureRecipeRepository {
    async fn insert(&self, _record: &NewRecipe) -> Result<RecipeId, RecipeRepositoryError> {
        RecipeId::new("fixture-recipe").map_err(|err| RecipeRepositoryError::rejected(err.to_string()))
    }

    async fn find_by_id(&self, _id: &RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        Ok(None)
    }

    async fn list_by_owner(
        &self,
        _owner_id: &AccountId,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        Ok(Vec::new())
    }

    async fn update(
        &self,
        _id: &RecipeId,
        _changes: &RecipeChanges,
    ) -> Result<bool, RecipeRepositoryError> {
        Ok(true)
    }

    async fn delete(&self, _id: &RecipeId) -> Result<(), RecipeRepositoryError> {
        Ok(())
    }
}
