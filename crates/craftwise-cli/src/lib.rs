//! # Craftwise CLI
//!
//! Command line front end for the Craftwise resolver.
//!
//! This crate provides:
//! - Configuration loaded from `craftwise.toml`
//! - Snapshot loading from a JSON data directory
//! - Favorites persisted to a JSON file
//! - Rendering of one result page

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod favorites_file;
pub mod report;
pub mod snapshot_loader;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::favorites_file::*;
    pub use crate::report::*;
    pub use crate::snapshot_loader::*;
}

pub use prelude::*;
