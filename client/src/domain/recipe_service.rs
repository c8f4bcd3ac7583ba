//! Recipe store services implementing the command and query driving ports.
//!
//! The command service owns the image-blob lifecycle alongside the record
//! lifecycle: uploads happen before record writes, and blob cleanup on
//! update and delete is best-effort. The query service fetches the full
//! owner-scoped set and filters in process; there is no server-side text
//! index behind search.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, warn};
use url::Url;

use crate::domain::ports::{
    BlobPath, BlobStore, BlobStoreError, CreateRecipeRequest, DeleteRecipeRequest,
    GetRecipeRequest, ListRecipesRequest, RecipeCommand, RecipeQuery, RecipeRepository,
    RecipeRepositoryError, SearchRecipesRequest, UpdateRecipeRequest, UploadImageRequest,
};
use crate::domain::{
    AccountId, Error, ImageSource, ImageUpload, NewRecipe, Recipe, RecipeChanges, RecipeFields,
};

/// Recipe store service implementing the mutation driving port.
#[derive(Clone)]
pub struct RecipeCommandService<R, B> {
    recipes: Arc<R>,
    blobs: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<R, B> RecipeCommandService<R, B> {
    /// Create a command service over a document and a blob backend.
    ///
    /// The clock stamps `createdAt` on inserts.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use client::domain::RecipeCommandService;
    /// # use client::domain::ports::{FixtureBlobStore, FixtureRecipeRepository, RecipeCommand};
    /// # use mockable::DefaultClock;
    /// # async fn example() -> Result<(), client::domain::Error> {
    /// let service = RecipeCommandService::new(
    ///     Arc::new(FixtureRecipeRepository),
    ///     Arc::new(FixtureBlobStore),
    ///     Arc::new(DefaultClock),
    /// );
    /// let _ = service.create_recipe(todo!("construct request payload")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(recipes: Arc<R>, blobs: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            recipes,
            blobs,
            clock,
        }
    }
}

impl<R, B> RecipeCommandService<R, B>
where
    R: RecipeRepository,
    B: BlobStore,
{
    /// Resolve the request image into the URL stored on the record.
    async fn resolve_image(
        &self,
        owner_id: &AccountId,
        image: Option<ImageSource>,
    ) -> Result<Option<Url>, Error> {
        match image {
            None => Ok(None),
            Some(ImageSource::External(url)) => Ok(Some(url)),
            Some(ImageSource::Upload(upload)) => {
                let url = self.upload_to_owner_path(owner_id, &upload).await?;
                Ok(Some(url))
            }
        }
    }

    async fn upload_to_owner_path(
        &self,
        owner_id: &AccountId,
        upload: &ImageUpload,
    ) -> Result<Url, Error> {
        let path = BlobPath::for_recipe_image(owner_id, upload.file_name());
        let reference = self
            .blobs
            .upload(&path, upload.bytes())
            .await
            .map_err(map_upload_error)?;
        let url = self
            .blobs
            .resolve_url(&reference)
            .await
            .map_err(map_upload_error)?;
        debug!(%path, "image uploaded");
        Ok(url)
    }

    /// Best-effort removal of a blob this store owns.
    ///
    /// Failures are logged and swallowed. A missing URL, or one the blob
    /// backend does not recognise as its own, is a no-op.
    async fn discard_owned_blob(&self, url: Option<&Url>) {
        let Some(url) = url else { return };
        let Some(reference) = self.blobs.reference_for_url(url) else {
            return;
        };
        if let Err(error) = self.blobs.delete(&reference).await {
            warn!(%reference, %error, "old image cleanup failed");
        }
    }
}

#[async_trait]
impl<R, B> RecipeCommand for RecipeCommandService<R, B>
where
    R: RecipeRepository,
    B: BlobStore,
{
    async fn create_recipe(&self, request: CreateRecipeRequest) -> Result<Recipe, Error> {
        let owner_id = require_owner(request.owner_id)?;
        let fields = RecipeFields::try_from(request.draft)?;
        let image_url = self.resolve_image(&owner_id, request.image).await?;
        let record = NewRecipe::new(owner_id, fields, image_url, self.clock.utc());
        let id = self
            .recipes
            .insert(&record)
            .await
            .map_err(|error| map_repository_error(error, "Failed to save the recipe."))?;
        debug!(recipe = %id, "recipe created");
        Ok(Recipe::from_new(id, record))
    }

    async fn update_recipe(&self, request: UpdateRecipeRequest) -> Result<Recipe, Error> {
        let owner_id = require_owner(request.owner_id)?;
        let fields = RecipeFields::try_from(request.draft)?;
        let existing = self
            .recipes
            .find_by_id(&request.recipe_id)
            .await
            .map_err(|error| map_repository_error(error, "Failed to update the recipe."))?
            .ok_or_else(recipe_not_found)?;

        let image_url = match request.image {
            None => existing.image_url().cloned(),
            Some(source) => {
                self.discard_owned_blob(existing.image_url()).await;
                self.resolve_image(&owner_id, Some(source)).await?
            }
        };

        let changes = RecipeChanges::new(fields, image_url);
        let replaced = self
            .recipes
            .update(&request.recipe_id, &changes)
            .await
            .map_err(|error| map_repository_error(error, "Failed to update the recipe."))?;
        if !replaced {
            return Err(recipe_not_found());
        }
        debug!(recipe = %request.recipe_id, "recipe updated");
        Ok(existing.updated_with(&changes))
    }

    async fn delete_recipe(&self, request: DeleteRecipeRequest) -> Result<(), Error> {
        self.discard_owned_blob(request.image_url.as_ref()).await;
        self.recipes
            .delete(&request.recipe_id)
            .await
            .map_err(map_delete_error)?;
        debug!(recipe = %request.recipe_id, "recipe deleted");
        Ok(())
    }

    async fn upload_image(&self, request: UploadImageRequest) -> Result<Url, Error> {
        let owner_id = require_owner(request.owner_id)?;
        self.upload_to_owner_path(&owner_id, &request.image).await
    }
}

/// Recipe store service implementing the read driving port.
#[derive(Clone)]
pub struct RecipeQueryService<R> {
    recipes: Arc<R>,
}

impl<R> RecipeQueryService<R> {
    /// Create a query service over a document backend.
    pub fn new(recipes: Arc<R>) -> Self {
        Self { recipes }
    }
}

#[async_trait]
impl<R> RecipeQuery for RecipeQueryService<R>
where
    R: RecipeRepository,
{
    async fn get_recipe(&self, request: GetRecipeRequest) -> Result<Recipe, Error> {
        self.recipes
            .find_by_id(&request.recipe_id)
            .await
            .map_err(|error| map_repository_error(error, "Failed to load recipes."))?
            .ok_or_else(recipe_not_found)
    }

    async fn list_recipes(&self, request: ListRecipesRequest) -> Result<Vec<Recipe>, Error> {
        let owner_id = require_owner(request.owner_id)?;
        self.recipes
            .list_by_owner(&owner_id)
            .await
            .map_err(|error| map_repository_error(error, "Failed to load recipes."))
    }

    async fn search_recipes(&self, request: SearchRecipesRequest) -> Result<Vec<Recipe>, Error> {
        let owner_id = require_owner(request.owner_id)?;
        let recipes = self
            .recipes
            .list_by_owner(&owner_id)
            .await
            .map_err(|error| map_repository_error(error, "Failed to load recipes."))?;
        let term = request.term.to_lowercase();
        Ok(recipes
            .into_iter()
            .filter(|recipe| {
                matches_term(recipe, &term) && request.category.matches(recipe.category())
            })
            .collect())
    }
}

// The empty term matches everything; `contains("")` is always true.
fn matches_term(recipe: &Recipe, lowercase_term: &str) -> bool {
    recipe.title().to_lowercase().contains(lowercase_term)
        || recipe.description().to_lowercase().contains(lowercase_term)
        || recipe.ingredients().to_lowercase().contains(lowercase_term)
}

fn require_owner(owner_id: Option<AccountId>) -> Result<AccountId, Error> {
    owner_id.ok_or_else(|| Error::unauthenticated("You must be signed in to manage recipes."))
}

fn recipe_not_found() -> Error {
    Error::not_found("Recipe not found.")
}

fn map_repository_error(error: RecipeRepositoryError, message: &str) -> Error {
    warn!(%error, "document backend call failed");
    Error::backend(message)
}

fn map_upload_error(error: BlobStoreError) -> Error {
    warn!(%error, "image upload failed");
    Error::upload_failed("Failed to upload the image.")
}

fn map_delete_error(error: RecipeRepositoryError) -> Error {
    warn!(%error, "recipe delete failed");
    Error::delete_failed("Failed to delete the recipe.")
}

#[cfg(test)]
#[path = "recipe_service_tests.rs"]
mod tests;
