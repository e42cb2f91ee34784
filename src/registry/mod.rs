//! registry
//!
//! Pluggable store of accepted and consumed reference codes.
//!
//! # Architecture
//!
//! The `Registry` trait defines a single async lookup. Commands use the
//! [`create_registry`] factory rather than constructing a store directly.
//!
//! - Registry lookups run only after local validation has passed
//! - A registry failure never turns a valid code into an invalid one
//! - Single-use consumption is a feature of the stores, not of the core
//!
//! # Modules
//!
//! - `traits`: `Registry` trait, `RegistryStatus`, `Submission`, `RegistryError`
//! - [`mock`]: In-memory registry for deterministic testing
//! - `file_store`: JSON file registry with atomic writes and locking
//! - `http`: Client for a remote validation backend
//! - `factory`: Provider selection and creation
//!
//! # Example
//!
//! ```ignore
//! use refcode::registry::{create_registry, RegistryStatus};
//!
//! let registry = create_registry(&config.registry_settings()?)?;
//! match registry.lookup(&code, &identity).await? {
//!     RegistryStatus::Available(s) => println!("form {}", s.form_id),
//!     RegistryStatus::NotFound => println!("not registered"),
//!     RegistryStatus::AlreadyUsed(_) => println!("already used"),
//! }
//! ```

mod factory;
mod file_store;
mod http;
pub mod mock;
mod traits;

pub use factory::{
    create_registry, valid_provider_names, NoRegistry, RegistryEndpoint, RegistryProvider,
    RegistrySettings,
};
pub use file_store::FileRegistry;
pub use http::HttpRegistry;
pub use traits::*;
