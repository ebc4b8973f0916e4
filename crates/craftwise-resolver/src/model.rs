//! Catalog records: items, recipes, ingredients, disciplines and rarities.
//!
//! This module provides:
//! - The eight ordered rarity tiers
//! - Crafting disciplines and their rating cap
//! - Item and recipe records with builders
//!
//! All records are immutable once loaded into a [`CatalogStore`](crate::catalog::CatalogStore).

use craftwise_common::{CatalogError, ItemId, RecipeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest rating any discipline can reach.
pub const MAX_RATING: u32 = 500;

/// Rating at or above which a recipe is considered "interesting" by default.
pub const NOTABLE_RATING: u32 = 400;

// ============================================================================
// Rarity
// ============================================================================

/// Item rarity tiers, lowest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Rarity {
    /// Junk.
    Junk,
    /// Basic.
    #[default]
    Basic,
    /// Fine.
    Fine,
    /// Masterwork.
    Masterwork,
    /// Rare.
    Rare,
    /// Exotic.
    Exotic,
    /// Ascended.
    Ascended,
    /// Legendary.
    Legendary,
}

impl Rarity {
    /// Get all tiers in ascending order.
    #[must_use]
    pub fn all() -> &'static [Rarity] {
        &[
            Self::Junk,
            Self::Basic,
            Self::Fine,
            Self::Masterwork,
            Self::Rare,
            Self::Exotic,
            Self::Ascended,
            Self::Legendary,
        ]
    }

    /// Get display name for this tier.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Junk => "Junk",
            Self::Basic => "Basic",
            Self::Fine => "Fine",
            Self::Masterwork => "Masterwork",
            Self::Rare => "Rare",
            Self::Exotic => "Exotic",
            Self::Ascended => "Ascended",
            Self::Legendary => "Legendary",
        }
    }

    /// True for the two highest tiers.
    #[must_use]
    pub fn is_top_tier(self) -> bool {
        matches!(self, Self::Ascended | Self::Legendary)
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|r| r.display_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown rarity: {s}"))
    }
}

// ============================================================================
// Disciplines
// ============================================================================

/// A crafting discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Discipline {
    /// Heavy armor.
    Armorsmith,
    /// Staves, foci, scepters, tridents.
    Artificer,
    /// Food and ingredients.
    Chef,
    /// Bows, pistols, rifles, torches, warhorns.
    Huntsman,
    /// Trinkets.
    Jeweler,
    /// Medium armor.
    Leatherworker,
    /// Guild decorations and consumables.
    Scribe,
    /// Light armor.
    Tailor,
    /// Swords, axes, hammers, shields.
    Weaponsmith,
}

impl Discipline {
    /// Get all disciplines.
    #[must_use]
    pub fn all() -> &'static [Discipline] {
        &[
            Self::Armorsmith,
            Self::Artificer,
            Self::Chef,
            Self::Huntsman,
            Self::Jeweler,
            Self::Leatherworker,
            Self::Scribe,
            Self::Tailor,
            Self::Weaponsmith,
        ]
    }

    /// Get display name for this discipline.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Armorsmith => "Armorsmith",
            Self::Artificer => "Artificer",
            Self::Chef => "Chef",
            Self::Huntsman => "Huntsman",
            Self::Jeweler => "Jeweler",
            Self::Leatherworker => "Leatherworker",
            Self::Scribe => "Scribe",
            Self::Tailor => "Tailor",
            Self::Weaponsmith => "Weaponsmith",
        }
    }

    /// Highest rating reachable in this discipline.
    #[must_use]
    pub fn rating_cap(self) -> u32 {
        match self {
            Self::Jeweler | Self::Scribe => 400,
            _ => MAX_RATING,
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Alternate names some sources use for a discipline.
const DISCIPLINE_ALIASES: &[(&str, Discipline)] = &[("Cook", Discipline::Chef)];

impl FromStr for Discipline {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|d| d.display_name().eq_ignore_ascii_case(name))
            .or_else(|| {
                DISCIPLINE_ALIASES
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                    .map(|&(_, d)| d)
            })
            .ok_or_else(|| CatalogError::UnknownDiscipline(s.to_string()))
    }
}

// ============================================================================
// Items
// ============================================================================

/// Catalog metadata for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Rarity tier.
    #[serde(default)]
    pub rarity: Rarity,
    /// Primary category, e.g. `CraftingMaterial` or `Weapon`.
    #[serde(default, rename = "type")]
    pub item_type: String,
    /// Optional sub-category, e.g. `Greatsword`.
    #[serde(default)]
    pub sub_type: Option<String>,
    /// Level requirement to use the item.
    #[serde(default)]
    pub level: u32,
}

impl Item {
    /// Create an item with the given name and rarity.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            id,
            name: name.into(),
            rarity,
            item_type: String::new(),
            sub_type: None,
            level: 0,
        }
    }

    /// Set the primary category.
    #[must_use]
    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = item_type.into();
        self
    }

    /// Set the sub-category.
    #[must_use]
    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    /// Set the level requirement.
    #[must_use]
    pub const fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

// ============================================================================
// Recipes
// ============================================================================

/// An ingredient requirement for a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Item type required.
    pub item: ItemId,
    /// Quantity required.
    pub count: u32,
}

impl Ingredient {
    /// Create a new ingredient requirement.
    #[must_use]
    pub const fn new(item: ItemId, count: u32) -> Self {
        Self { item, count }
    }
}

/// A crafting recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe identifier.
    pub id: RecipeId,
    /// Item produced.
    pub output: ItemId,
    /// Quantity produced per craft.
    pub output_count: u32,
    /// Recipe type, e.g. `Refinement` or `Insignia`.
    pub recipe_type: String,
    /// Eligible disciplines, in declaration order, without duplicates.
    pub disciplines: Vec<Discipline>,
    /// Minimum discipline rating required.
    pub min_rating: u32,
    /// Ingredients consumed, in declaration order.
    pub ingredients: Vec<Ingredient>,
    /// Time to craft in milliseconds.
    pub craft_time_ms: u32,
}

impl Recipe {
    /// Create a new recipe builder.
    #[must_use]
    pub fn builder(id: RecipeId, output: ItemId) -> RecipeBuilder {
        RecipeBuilder::new(id, output)
    }

    /// Check if any of the given disciplines can craft this recipe.
    #[must_use]
    pub fn uses_any_discipline(&self, disciplines: &[Discipline]) -> bool {
        self.disciplines.iter().any(|d| disciplines.contains(d))
    }

    /// Get total ingredient count.
    #[must_use]
    pub fn total_ingredient_count(&self) -> u64 {
        self.ingredients.iter().map(|i| u64::from(i.count)).sum()
    }
}

/// Builder for [`Recipe`].
#[derive(Debug)]
pub struct RecipeBuilder {
    id: RecipeId,
    output: ItemId,
    output_count: u32,
    recipe_type: String,
    disciplines: Vec<Discipline>,
    min_rating: u32,
    ingredients: Vec<Ingredient>,
    craft_time_ms: u32,
}

impl RecipeBuilder {
    /// Create new builder.
    fn new(id: RecipeId, output: ItemId) -> Self {
        Self {
            id,
            output,
            output_count: 1,
            recipe_type: String::new(),
            disciplines: Vec::new(),
            min_rating: 0,
            ingredients: Vec::new(),
            craft_time_ms: 1000,
        }
    }

    /// Set quantity produced per craft.
    #[must_use]
    pub const fn output_count(mut self, count: u32) -> Self {
        self.output_count = count;
        self
    }

    /// Set recipe type.
    #[must_use]
    pub fn recipe_type(mut self, recipe_type: impl Into<String>) -> Self {
        self.recipe_type = recipe_type.into();
        self
    }

    /// Add an eligible discipline. Repeats are ignored.
    #[must_use]
    pub fn discipline(mut self, discipline: Discipline) -> Self {
        if !self.disciplines.contains(&discipline) {
            self.disciplines.push(discipline);
        }
        self
    }

    /// Set minimum rating.
    #[must_use]
    pub const fn min_rating(mut self, rating: u32) -> Self {
        self.min_rating = rating;
        self
    }

    /// Add an ingredient.
    #[must_use]
    pub fn ingredient(mut self, item: ItemId, count: u32) -> Self {
        self.ingredients.push(Ingredient::new(item, count));
        self
    }

    /// Set craft time.
    #[must_use]
    pub const fn craft_time_ms(mut self, ms: u32) -> Self {
        self.craft_time_ms = ms;
        self
    }

    /// Build the recipe without validation.
    #[must_use]
    pub fn build(self) -> Recipe {
        Recipe {
            id: self.id,
            output: self.output,
            output_count: self.output_count,
            recipe_type: self.recipe_type,
            disciplines: self.disciplines,
            min_rating: self.min_rating,
            ingredients: self.ingredients,
            craft_time_ms: self.craft_time_ms,
        }
    }

    /// Build the recipe, rejecting definitions the catalog cannot honour.
    pub fn try_build(self) -> Result<Recipe, CatalogError> {
        let id = self.id.raw();
        if self.disciplines.is_empty() {
            return Err(CatalogError::NoDiscipline(id));
        }
        // Reachable if any eligible discipline can get there.
        let cap = self
            .disciplines
            .iter()
            .map(|d| d.rating_cap())
            .max()
            .unwrap_or(MAX_RATING);
        if self.min_rating > cap {
            return Err(CatalogError::RatingOutOfRange {
                recipe: id,
                rating: self.min_rating,
                cap,
            });
        }
        if self.output_count == 0 {
            return Err(CatalogError::ZeroQuantity {
                recipe: id,
                what: "output".to_string(),
            });
        }
        if let Some(pos) = self.ingredients.iter().position(|i| i.count == 0) {
            return Err(CatalogError::ZeroQuantity {
                recipe: id,
                what: format!("ingredient {pos}"),
            });
        }
        Ok(self.build())
    }
}
