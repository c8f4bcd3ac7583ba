//! Recipe client core library.
//!
//! Data-access layer for a recipe manager: an observable account session,
//! a recipe store with image-blob lifecycle management, and the validation
//! rules shared by both. Backends (identity, documents, blobs) are injected
//! through the ports in [`domain::ports`]; ready-made adapters live in
//! [`outbound`].

pub mod domain;
pub mod outbound;
