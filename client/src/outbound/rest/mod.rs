//! Reqwest-backed adapters for the hosted REST backend.
//!
//! The family shares one [`RestBackend`] handle: the identity adapter
//! stores the session bearer token on it, and every adapter's requests then
//! carry that token alongside the project API key.

mod blobs;
mod client;
mod identity;
mod recipes;

pub use blobs::RestBlobStore;
pub use client::{RestBackend, RestBackendConfig};
pub use identity::RestIdentityGateway;
pub use recipes::RestRecipeRepository;
