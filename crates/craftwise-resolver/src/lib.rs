//! # Craftwise Resolver
//!
//! Crafting feasibility for a multi-character account.
//!
//! This crate provides:
//! - Catalog store (items, recipes, output reverse index)
//! - Inventory aggregation across storage sources
//! - Capability index (discipline -> characters and ratings)
//! - Craftability verdicts and crafter selection
//! - Recipe filtering, sorting and pagination
//! - Normalization of raw source payloads
//! - Reactive session fed by a source event bus
//! - Favorites with an injected store

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod browser;
pub mod capability;
pub mod catalog;
pub mod events;
pub mod favorites;
pub mod ingest;
pub mod inventory;
pub mod model;
pub mod query;
pub mod resolver;
pub mod selector;
pub mod session;


/// Prelude for convenient imports
pub mod prelude {
    pub use crate::browser::*;
    pub use crate::capability::*;
    pub use crate::catalog::*;
    pub use crate::events::*;
    pub use crate::favorites::*;
    pub use crate::ingest::*;
    pub use crate::inventory::*;
    pub use crate::model::*;
    pub use crate::query::*;
    pub use crate::resolver::*;
    pub use crate::selector::*;
    pub use crate::session::*;
}

pub use prelude::*;
