//! # Craftwise Common
//!
//! Common types shared by the Craftwise crates.
//!
//! This crate provides:
//! - ID types (ItemId, RecipeId, CharacterName)
//! - Version information for persisted files
//! - Catalog definition errors
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_raw_values() {
        let json = serde_json::to_string(&(ItemId::new(19_721), RecipeId::new(7)))
            .expect("serialize ids");
        assert_eq!(json, "[19721,7]");

        let name: CharacterName = serde_json::from_str("\"Aria Dawnsong\"").expect("parse name");
        assert_eq!(name.as_str(), "Aria Dawnsong");
    }

    #[test]
    fn test_character_name_borrows_as_str() {
        let mut set = std::collections::HashSet::new();
        set.insert(CharacterName::from("Aria"));
        assert!(set.contains("Aria"));
        assert!(!set.contains("aria"));
    }

    #[test]
    fn test_version_compatibility() {
        assert!(SchemaVersion::FAVORITES.can_read(&SchemaVersion::new(1, 3, 2)));
        assert!(!SchemaVersion::FAVORITES.can_read(&SchemaVersion::new(2, 0, 0)));
        assert_eq!(SchemaVersion::FAVORITES.to_string(), "1.0.0");
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::RatingOutOfRange {
            recipe: 12,
            rating: 600,
            cap: 500,
        };
        assert_eq!(err.to_string(), "Recipe 12 requires rating 600, above the cap of 500");
    }
}
