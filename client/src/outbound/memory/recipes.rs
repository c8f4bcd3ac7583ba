//! In-memory recipe document backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{AccountId, NewRecipe, Recipe, RecipeChanges, RecipeId};

/// Recipe document backend keeping every record in a process-local map.
///
/// Records iterate in identifier order, standing in for whatever ordering a
/// hosted document store happens to return.
pub struct MemoryRecipeRepository {
    data: Mutex<BTreeMap<String, Recipe>>,
}

impl MemoryRecipeRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            data: Mutex::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryRecipeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecipeRepository for MemoryRecipeRepository {
    async fn insert(&self, record: &NewRecipe) -> Result<RecipeId, RecipeRepositoryError> {
        let id = RecipeId::new(Uuid::new_v4().simple().to_string())
            .map_err(|err| RecipeRepositoryError::rejected(err.to_string()))?;
        let recipe = Recipe::from_new(id.clone(), record.clone());
        self.data
            .lock()
            .await
            .insert(id.as_ref().to_owned(), recipe);
        Ok(id)
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        Ok(self.data.lock().await.get(id.as_ref()).cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: &AccountId,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let data = self.data.lock().await;
        Ok(data
            .values()
            .filter(|recipe| recipe.owner_id() == owner_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: &RecipeId,
        changes: &RecipeChanges,
    ) -> Result<bool, RecipeRepositoryError> {
        let mut data = self.data.lock().await;
        let Some(existing) = data.get(id.as_ref()) else {
            return Ok(false);
        };
        let updated = existing.clone().updated_with(changes);
        data.insert(id.as_ref().to_owned(), updated);
        Ok(true)
    }

    async fn delete(&self, id: &RecipeId) -> Result<(), RecipeRepositoryError> {
        self.data.lock().await.remove(id.as_ref());
        Ok(())
    }
}
