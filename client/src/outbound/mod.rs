//! Outbound adapters implementing the domain ports for concrete backends.
//!
//! Adapters are thin translators between domain types and backend
//! representations; they contain no business logic. Two families ship with
//! the crate:
//!
//! - **memory**: process-local backends holding everything in maps, used by
//!   the integration suites and for trying the services without
//!   infrastructure.
//! - **rest**: adapters over a hosted HTTP backend, sharing one
//!   [`rest::RestBackend`] handle for connection, API key, and session
//!   token state.

pub mod memory;
pub mod rest;
