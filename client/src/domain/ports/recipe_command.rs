//! Driving port for recipe mutations.
//!
//! This port defines the presentation-facing contract for creating,
//! updating, and deleting recipes, plus the standalone image upload used by
//! image-first form flows.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{AccountId, Error, ImageSource, ImageUpload, Recipe, RecipeDraft, RecipeId};

/// Request to create a recipe for an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    /// Owner of the new recipe; `None` when no account is signed in.
    pub owner_id: Option<AccountId>,
    /// Raw form fields, validated before any backend call.
    pub draft: RecipeDraft,
    /// Optional image to attach.
    pub image: Option<ImageSource>,
}

/// Request to replace a recipe's updatable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    /// Recipe to update.
    pub recipe_id: RecipeId,
    /// Owner performing the update; `None` when no account is signed in.
    pub owner_id: Option<AccountId>,
    /// Raw form fields, validated before any backend call.
    pub draft: RecipeDraft,
    /// Replacement image; `None` keeps the current image untouched.
    pub image: Option<ImageSource>,
}

/// Request to delete a recipe and clean up its owned image blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecipeRequest {
    /// Recipe to delete.
    pub recipe_id: RecipeId,
    /// The recipe's image URL as known to the caller; used only for the
    /// best-effort blob cleanup.
    pub image_url: Option<Url>,
}

/// Request to upload an image without touching any recipe record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageRequest {
    /// Owner whose path the image is stored under; `None` when no account
    /// is signed in.
    pub owner_id: Option<AccountId>,
    /// Image bytes and file name.
    pub image: ImageUpload,
}

/// Presentation-facing recipe mutation operations.
#[async_trait]
pub trait RecipeCommand: Send + Sync {
    /// Validate, attach the image, and create the recipe.
    async fn create_recipe(&self, request: CreateRecipeRequest) -> Result<Recipe, Error>;

    /// Validate, swap the image, and replace the recipe's fields.
    async fn update_recipe(&self, request: UpdateRecipeRequest) -> Result<Recipe, Error>;

    /// Delete the recipe, cleaning up its owned image blob best-effort.
    async fn delete_recipe(&self, request: DeleteRecipeRequest) -> Result<(), Error>;

    /// Upload an image to the owner's path and return its servable URL.
    async fn upload_image(&self, request: UploadImageRequest) -> Result<Url, Error>;
}
