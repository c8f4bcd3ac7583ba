//! Process-local backends holding all state in maps.
//!
//! These adapters implement the full port contracts, including the failure
//! paths the hosted backend can produce, so the service layer can be
//! exercised end to end without infrastructure. Each adapter exposes a few
//! knobs for steering failures from tests.

mod blobs;
mod identity;
mod recipes;

pub use blobs::MemoryBlobStore;
pub use identity::MemoryIdentityGateway;
pub use recipes::MemoryRecipeRepository;
