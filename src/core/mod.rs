//! core
//!
//! Domain types, primitives, and the reference code scheme.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Identity, ReferenceCode, CodeSegments
//! - [`hash`] - User hash and checksum primitives
//! - [`timestamp`] - Timestamp segment encoding
//! - [`clock`] - Injectable time source
//! - [`generator`] - Issues reference codes
//! - [`validator`] - Validates reference codes and reports verdicts
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Generation and validation are pure apart from the clock and RNG
//! - The primitives are implemented once and shared
//! - Nothing here performs I/O except [`config`]

pub mod clock;
pub mod config;
pub mod generator;
pub mod hash;
pub mod timestamp;
pub mod types;
pub mod validator;
