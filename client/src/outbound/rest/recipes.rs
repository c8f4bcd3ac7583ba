//! Reqwest-backed recipe repository adapter.
//!
//! This adapter owns transport details only: record serialisation, HTTP
//! error mapping, and decoding of stored recipes. Ownership checks and
//! validation live in the domain services.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::client::{RestBackend, status_message};
use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{AccountId, Category, NewRecipe, Recipe, RecipeChanges, RecipeId};

/// Recipe repository backed by the hosted document endpoints.
pub struct RestRecipeRepository {
    backend: Arc<RestBackend>,
}

impl RestRecipeRepository {
    /// Build a repository over the shared transport handle.
    pub fn new(backend: Arc<RestBackend>) -> Self {
        Self { backend }
    }

    fn recipe_endpoint(&self, id: &RecipeId) -> Result<Url, RecipeRepositoryError> {
        self.backend
            .endpoint(&format!("recipes/{}", id.as_ref()))
            .map_err(map_endpoint_error)
    }
}

#[async_trait]
impl RecipeRepository for RestRecipeRepository {
    async fn insert(&self, record: &NewRecipe) -> Result<RecipeId, RecipeRepositoryError> {
        let url = self.backend.endpoint("recipes").map_err(map_endpoint_error)?;
        let response = self
            .backend
            .request(Method::POST, url)
            .json(&NewRecipeDto::from(record))
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let inserted: InsertedDto =
            serde_json::from_slice(body.as_ref()).map_err(map_decode_error)?;
        Ok(inserted.id)
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let url = self.recipe_endpoint(id)?;
        let response = self
            .backend
            .request(Method::GET, url)
            .send()
            .await
            .map_err(map_transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let recipe: Recipe = serde_json::from_slice(body.as_ref()).map_err(map_decode_error)?;
        Ok(Some(recipe))
    }

    async fn list_by_owner(
        &self,
        owner_id: &AccountId,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let mut url = self.backend.endpoint("recipes").map_err(map_endpoint_error)?;
        url.query_pairs_mut()
            .append_pair("ownerId", owner_id.as_ref());
        let response = self
            .backend
            .request(Method::GET, url)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref()).map_err(map_decode_error)
    }

    async fn update(
        &self,
        id: &RecipeId,
        changes: &RecipeChanges,
    ) -> Result<bool, RecipeRepositoryError> {
        let url = self.recipe_endpoint(id)?;
        let response = self
            .backend
            .request(Method::PUT, url)
            .json(&RecipeChangesDto::from(changes))
            .send()
            .await
            .map_err(map_transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(true)
    }

    async fn delete(&self, id: &RecipeId) -> Result<(), RecipeRepositoryError> {
        let url = self.recipe_endpoint(id)?;
        let response = self
            .backend
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(map_transport_error)?;
        // Deleting an absent document already satisfies the contract.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewRecipeDto<'a> {
    owner_id: &'a AccountId,
    title: &'a str,
    description: &'a str,
    ingredients: &'a str,
    instructions: &'a str,
    prep_time_minutes: u32,
    cook_time_minutes: u32,
    category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a Url>,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a NewRecipe> for NewRecipeDto<'a> {
    fn from(record: &'a NewRecipe) -> Self {
        let fields = record.fields();
        Self {
            owner_id: record.owner_id(),
            title: fields.title(),
            description: fields.description(),
            ingredients: fields.ingredients(),
            instructions: fields.instructions(),
            prep_time_minutes: fields.prep_time_minutes(),
            cook_time_minutes: fields.cook_time_minutes(),
            category: fields.category(),
            image_url: record.image_url(),
            created_at: record.created_at(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecipeChangesDto<'a> {
    title: &'a str,
    description: &'a str,
    ingredients: &'a str,
    instructions: &'a str,
    prep_time_minutes: u32,
    cook_time_minutes: u32,
    category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a Url>,
}

impl<'a> From<&'a RecipeChanges> for RecipeChangesDto<'a> {
    fn from(changes: &'a RecipeChanges) -> Self {
        let fields = changes.fields();
        Self {
            title: fields.title(),
            description: fields.description(),
            ingredients: fields.ingredients(),
            instructions: fields.instructions(),
            prep_time_minutes: fields.prep_time_minutes(),
            cook_time_minutes: fields.cook_time_minutes(),
            category: fields.category(),
            image_url: changes.image_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InsertedDto {
    id: RecipeId,
}

fn map_endpoint_error(error: url::ParseError) -> RecipeRepositoryError {
    RecipeRepositoryError::rejected(error.to_string())
}

fn map_transport_error(error: reqwest::Error) -> RecipeRepositoryError {
    RecipeRepositoryError::unreachable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RecipeRepositoryError {
    RecipeRepositoryError::rejected(status_message(status, body))
}

fn map_decode_error(error: serde_json::Error) -> RecipeRepositoryError {
    RecipeRepositoryError::rejected(format!("invalid recipe payload: {error}"))
}
