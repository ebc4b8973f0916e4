//! Catalog store: the session's immutable items and recipes.
//!
//! This module provides:
//! - Lookup of items and recipes by id
//! - The reverse index from output item to producing recipe
//! - A naive name search over items
//!
//! The store is built once per load and never patched. Reloading builds a
//! fresh store and swaps it in whole.

use ahash::AHashMap;
use craftwise_common::{ItemId, RecipeId};
use tracing::{debug, info, warn};

use crate::model::{Ingredient, Item, Recipe};

/// Load statistics for a catalog.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    /// Number of items stored.
    pub items: usize,
    /// Number of recipes stored.
    pub recipes: usize,
    /// Recipes whose output item already had a producing recipe.
    pub output_collisions: usize,
    /// Items or recipes skipped because their id was already loaded.
    pub duplicate_ids: usize,
}

/// Registry for all items and recipes of a session.
#[derive(Debug, Default, Clone)]
pub struct CatalogStore {
    /// Items in load order.
    items: Vec<Item>,
    /// Item position by id.
    item_index: AHashMap<ItemId, usize>,
    /// Recipes in load order.
    recipes: Vec<Recipe>,
    /// Recipe position by id.
    recipe_index: AHashMap<RecipeId, usize>,
    /// First recipe producing each item.
    by_output: AHashMap<ItemId, usize>,
    /// Every recipe producing each item, in load order.
    by_output_all: AHashMap<ItemId, Vec<usize>>,
    /// Load statistics.
    stats: CatalogStats,
}

impl CatalogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from item and recipe lists.
    #[must_use]
    pub fn from_parts(items: Vec<Item>, recipes: Vec<Recipe>) -> Self {
        let mut store = Self::new();
        store.load(items, recipes);
        store
    }

    /// Replace the catalog with the given items and recipes.
    ///
    /// Duplicate ids keep the first entry. When two recipes produce the
    /// same item, the first one loaded is used for output lookups.
    pub fn load(&mut self, items: Vec<Item>, recipes: Vec<Recipe>) {
        let mut next = Self::default();

        for item in items {
            if next.item_index.contains_key(&item.id) {
                debug!("Skipping duplicate item id {}", item.id);
                next.stats.duplicate_ids += 1;
                continue;
            }
            next.item_index.insert(item.id, next.items.len());
            next.items.push(item);
        }

        for recipe in recipes {
            if next.recipe_index.contains_key(&recipe.id) {
                warn!("Skipping duplicate recipe id {}", recipe.id);
                next.stats.duplicate_ids += 1;
                continue;
            }
            let pos = next.recipes.len();
            next.recipe_index.insert(recipe.id, pos);

            if let Some(&first) = next.by_output.get(&recipe.output) {
                warn!(
                    "Item {} is produced by recipes {} and {}; using {} for output lookups",
                    recipe.output, next.recipes[first].id, recipe.id, next.recipes[first].id
                );
                next.stats.output_collisions += 1;
            } else {
                next.by_output.insert(recipe.output, pos);
            }
            next.by_output_all.entry(recipe.output).or_default().push(pos);

            next.recipes.push(recipe);
        }

        next.stats.items = next.items.len();
        next.stats.recipes = next.recipes.len();
        info!(
            "Loaded catalog: {} items, {} recipes ({} output collisions)",
            next.stats.items, next.stats.recipes, next.stats.output_collisions
        );

        *self = next;
    }

    /// Get item by ID.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.item_index.get(&id).map(|&pos| &self.items[pos])
    }

    /// Get recipe by ID.
    #[must_use]
    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipe_index.get(&id).map(|&pos| &self.recipes[pos])
    }

    /// Get the recipe that produces an item.
    #[must_use]
    pub fn recipe_by_output(&self, item: ItemId) -> Option<&Recipe> {
        self.by_output.get(&item).map(|&pos| &self.recipes[pos])
    }

    /// Get every recipe that produces an item, in load order.
    #[must_use]
    pub fn recipes_by_output_all(&self, item: ItemId) -> Vec<&Recipe> {
        self.by_output_all
            .get(&item)
            .map(|positions| positions.iter().map(|&pos| &self.recipes[pos]).collect())
            .unwrap_or_default()
    }

    /// Get the recipe that produces an ingredient, for drilling into sub-recipes.
    #[must_use]
    pub fn sub_recipe(&self, ingredient: &Ingredient) -> Option<&Recipe> {
        self.recipe_by_output(ingredient.item)
    }

    /// Get the output item of a recipe, if the catalog knows it.
    #[must_use]
    pub fn output_item(&self, recipe: &Recipe) -> Option<&Item> {
        self.item(recipe.output)
    }

    /// Search items by display name (case-insensitive substring).
    ///
    /// A blank query matches nothing.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Item> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&query))
            .take(limit)
            .collect()
    }

    /// Get all recipes in load order.
    pub fn recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    /// Get all items in load order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Position of a recipe in load order.
    #[must_use]
    pub fn position(&self, id: RecipeId) -> Option<usize> {
        self.recipe_index.get(&id).copied()
    }

    /// Get recipe count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Check if the store has no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Load statistics.
    #[must_use]
    pub const fn stats(&self) -> CatalogStats {
        self.stats
    }
}
