//! Driving port for recipe reads and client-side search.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, CategoryFilter, Error, Recipe, RecipeId};

/// Request to fetch a single recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRecipeRequest {
    /// Recipe to fetch.
    pub recipe_id: RecipeId,
}

/// Request to list every recipe an owner has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecipesRequest {
    /// Owner whose recipes are listed; `None` when no account is signed in.
    pub owner_id: Option<AccountId>,
}

/// Request to search an owner's recipes.
///
/// The full owner-scoped set is fetched and filtered client-side; there is
/// no server-side text index behind this operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecipesRequest {
    /// Owner whose recipes are searched; `None` when no account is signed
    /// in.
    pub owner_id: Option<AccountId>,
    /// Case-insensitive substring matched against title, description, and
    /// ingredients; the empty string matches everything.
    pub term: String,
    /// Category predicate, with `all` matching every category.
    pub category: CategoryFilter,
}

/// Presentation-facing recipe read operations.
#[async_trait]
pub trait RecipeQuery: Send + Sync {
    /// Fetch one recipe by identifier.
    async fn get_recipe(&self, request: GetRecipeRequest) -> Result<Recipe, Error>;

    /// Fetch every recipe belonging to the owner, in backend order.
    async fn list_recipes(&self, request: ListRecipesRequest) -> Result<Vec<Recipe>, Error>;

    /// Fetch the owner's recipes and filter them by term and category.
    async fn search_recipes(&self, request: SearchRecipesRequest) -> Result<Vec<Recipe>, Error>;
}
