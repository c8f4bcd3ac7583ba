//! Domain ports and supporting types for the hexagonal boundary.

mod blob_store;
mod identity_gateway;
mod recipe_command;
mod recipe_query;
mod recipe_repository;

#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobPath, BlobReference, BlobStore, BlobStoreError, FixtureBlobStore};
#[cfg(test)]
pub use identity_gateway::MockIdentityGateway;
pub use identity_gateway::{FixtureIdentityGateway, IdentityGateway, IdentityGatewayError};
pub use recipe_command::{
    CreateRecipeRequest, DeleteRecipeRequest, RecipeCommand, UpdateRecipeRequest,
    UploadImageRequest,
};
pub use recipe_query::{GetRecipeRequest, ListRecipesRequest, RecipeQuery, SearchRecipesRequest};
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{FixtureRecipeRepository, RecipeRepository, RecipeRepositoryError};
