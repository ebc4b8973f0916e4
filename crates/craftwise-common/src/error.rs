//! Catalog definition errors shared by the loader and the resolver.

use thiserror::Error;

/// Catalog definition errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Recipe with no eligible discipline
    #[error("Recipe {0} has no eligible discipline")]
    NoDiscipline(u32),

    /// Minimum rating above the discipline cap
    #[error("Recipe {recipe} requires rating {rating}, above the cap of {cap}")]
    RatingOutOfRange {
        /// Recipe id
        recipe: u32,
        /// Rating found
        rating: u32,
        /// Highest allowed rating
        cap: u32,
    },

    /// Zero output or ingredient quantity
    #[error("Recipe {recipe} has zero quantity for {what}")]
    ZeroQuantity {
        /// Recipe id
        recipe: u32,
        /// Which field was zero
        what: String,
    },

    /// Discipline name that is not recognised
    #[error("Unknown discipline: {0}")]
    UnknownDiscipline(String),
}
