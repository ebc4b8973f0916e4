//! Craftability resolution.
//!
//! Joins inventory totals against recipe ingredients and the capability
//! index against discipline/rating requirements. The output is a fresh
//! [`VerdictMap`] every time; verdicts are never patched in place.

use ahash::AHashMap;
use craftwise_common::{ItemId, RecipeId};
use serde::{Deserialize, Serialize};

use crate::capability::{CapabilityIndex, CapableCharacter};
use crate::catalog::CatalogStore;
use crate::inventory::InventoryTotals;
use crate::model::Recipe;

/// Per-recipe craftability result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftabilityVerdict {
    /// Whether every ingredient is held in sufficient quantity.
    pub has_ingredients: bool,
    /// Characters able to craft, in discipline order then bucket order.
    pub capable_characters: Vec<CapableCharacter>,
}

impl CraftabilityVerdict {
    /// A verdict with ingredients missing.
    #[must_use]
    pub fn missing_ingredients() -> Self {
        Self::default()
    }

    /// Returns true if at least one character can craft the recipe now.
    #[must_use]
    pub fn is_craftable(&self) -> bool {
        self.has_ingredients && !self.capable_characters.is_empty()
    }

    /// Returns true if the named character is among the capable ones.
    #[must_use]
    pub fn is_capable(&self, character: &str) -> bool {
        self.capable_characters
            .iter()
            .any(|c| c.character.as_str() == character)
    }
}

/// Verdicts for every recipe in a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerdictMap {
    verdicts: AHashMap<RecipeId, CraftabilityVerdict>,
    populated: bool,
}

impl VerdictMap {
    /// Creates an empty map with no data behind it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the verdict for a recipe.
    #[must_use]
    pub fn get(&self, id: RecipeId) -> Option<&CraftabilityVerdict> {
        self.verdicts.get(&id)
    }

    /// True when both inventory and capability inputs held data when resolved.
    #[must_use]
    pub const fn is_populated(&self) -> bool {
        self.populated
    }

    /// Recipes with at least one capable character.
    pub fn craftable(&self) -> impl Iterator<Item = RecipeId> + '_ {
        self.verdicts
            .iter()
            .filter(|(_, v)| v.is_craftable())
            .map(|(&id, _)| id)
    }

    /// Number of craftable recipes.
    #[must_use]
    pub fn craftable_count(&self) -> usize {
        self.craftable().count()
    }

    /// Number of verdicts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    /// Returns true if no verdicts exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

/// Ingredient row with availability, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientStatus {
    /// Item required.
    pub item: ItemId,
    /// Quantity required.
    pub required: u32,
    /// Quantity held across all storage.
    pub available: u64,
}

impl IngredientStatus {
    /// Whether we have enough.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.available >= u64::from(self.required)
    }

    /// Returns how many more items are needed.
    #[must_use]
    pub fn missing_count(&self) -> u64 {
        u64::from(self.required).saturating_sub(self.available)
    }
}

/// Checks ingredient sufficiency, stopping at the first short ingredient.
///
/// Ingredients the catalog does not know are checked like any other: the
/// totals decide, and an absent total is 0.
#[must_use]
pub fn has_ingredients(recipe: &Recipe, totals: &InventoryTotals) -> bool {
    recipe
        .ingredients
        .iter()
        .all(|ingredient| totals.has(ingredient.item, ingredient.count))
}

/// Per-ingredient availability for a recipe.
#[must_use]
pub fn ingredient_status(recipe: &Recipe, totals: &InventoryTotals) -> Vec<IngredientStatus> {
    recipe
        .ingredients
        .iter()
        .map(|ingredient| IngredientStatus {
            item: ingredient.item,
            required: ingredient.count,
            available: totals.count(ingredient.item),
        })
        .collect()
}

/// Characters able to craft a recipe, ignoring ingredients.
///
/// Walks eligible disciplines in recipe order and each bucket in index
/// order; a character qualifying through two disciplines appears once,
/// with the rating from the first qualifying discipline.
#[must_use]
pub fn capable_characters(recipe: &Recipe, index: &CapabilityIndex) -> Vec<CapableCharacter> {
    let mut capable: Vec<CapableCharacter> = Vec::new();
    for &discipline in &recipe.disciplines {
        for entry in index.bucket(discipline) {
            if entry.rating < recipe.min_rating {
                continue;
            }
            if capable.iter().any(|c| c.character == entry.character) {
                continue;
            }
            capable.push(entry.clone());
        }
    }
    capable
}

/// Computes the verdict for a single recipe.
#[must_use]
pub fn resolve_recipe(
    recipe: &Recipe,
    totals: &InventoryTotals,
    index: &CapabilityIndex,
) -> CraftabilityVerdict {
    if !has_ingredients(recipe, totals) {
        return CraftabilityVerdict::missing_ingredients();
    }
    CraftabilityVerdict {
        has_ingredients: true,
        capable_characters: capable_characters(recipe, index),
    }
}

/// Computes verdicts for every recipe in the catalog.
#[must_use]
pub fn resolve(
    catalog: &CatalogStore,
    totals: &InventoryTotals,
    index: &CapabilityIndex,
) -> VerdictMap {
    let verdicts = catalog
        .recipes()
        .map(|recipe| (recipe.id, resolve_recipe(recipe, totals, index)))
        .collect();

    VerdictMap {
        verdicts,
        populated: !totals.is_empty() && !index.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{build_index, CharacterCraftingProfile};
    use crate::inventory::{aggregate, InventoryStack, StorageSource};
    use crate::model::Discipline;
    use craftwise_common::CharacterName;
    use proptest::prelude::*;

    fn totals(pairs: &[(u32, u32)]) -> InventoryTotals {
        let stacks: Vec<_> = pairs
            .iter()
            .map(|&(item, count)| {
                Some(InventoryStack::new(
                    ItemId::new(item),
                    count,
                    StorageSource::Materials,
                ))
            })
            .collect();
        aggregate(&[stacks])
    }

    fn index(entries: &[(&str, Discipline, u32)]) -> CapabilityIndex {
        let mut grouped: Vec<(CharacterName, Vec<CharacterCraftingProfile>)> = Vec::new();
        for &(name, discipline, rating) in entries {
            let profile = CharacterCraftingProfile::new(name, discipline, rating, true);
            match grouped.iter_mut().find(|(n, _)| n.as_str() == name) {
                Some((_, list)) => list.push(profile),
                None => grouped.push((CharacterName::from(name), vec![profile])),
            }
        }
        build_index(&grouped)
    }

    fn armor_recipe() -> Recipe {
        Recipe::builder(RecipeId::new(1), ItemId::new(100))
            .discipline(Discipline::Armorsmith)
            .discipline(Discipline::Tailor)
            .min_rating(200)
            .ingredient(ItemId::new(5), 10)
            .build()
    }

    #[test]
    fn test_missing_ingredient_means_no_crafters() {
        let recipe = armor_recipe();
        let verdict = resolve_recipe(
            &recipe,
            &totals(&[(5, 9)]),
            &index(&[("Aria", Discipline::Armorsmith, 500)]),
        );
        assert!(!verdict.has_ingredients);
        assert!(verdict.capable_characters.is_empty());
        assert!(!verdict.is_craftable());
    }

    #[test]
    fn test_rating_threshold_inclusive() {
        let recipe = armor_recipe();
        let verdict = resolve_recipe(
            &recipe,
            &totals(&[(5, 10)]),
            &index(&[
                ("Low", Discipline::Armorsmith, 199),
                ("Exact", Discipline::Armorsmith, 200),
            ]),
        );
        assert!(verdict.has_ingredients);
        assert_eq!(
            verdict.capable_characters,
            vec![CapableCharacter::new("Exact", 200)]
        );
    }

    #[test]
    fn test_capable_character_dedup_across_disciplines() {
        let recipe = armor_recipe();
        let verdict = resolve_recipe(
            &recipe,
            &totals(&[(5, 10)]),
            &index(&[
                ("Aria", Discipline::Armorsmith, 400),
                ("Bram", Discipline::Tailor, 300),
                ("Aria", Discipline::Tailor, 450),
            ]),
        );
        assert_eq!(
            verdict.capable_characters,
            vec![
                CapableCharacter::new("Aria", 400),
                CapableCharacter::new("Bram", 300)
            ]
        );
    }

    #[test]
    fn test_order_follows_discipline_then_bucket() {
        let recipe = armor_recipe();
        let verdict = resolve_recipe(
            &recipe,
            &totals(&[(5, 10)]),
            &index(&[
                ("Tess", Discipline::Tailor, 400),
                ("Cade", Discipline::Armorsmith, 400),
                ("Bo", Discipline::Armorsmith, 250),
            ]),
        );
        let names: Vec<_> = verdict
            .capable_characters
            .iter()
            .map(|c| c.character.as_str())
            .collect();
        assert_eq!(names, vec!["Cade", "Bo", "Tess"]);
    }

    #[test]
    fn test_orphaned_ingredient_uses_totals() {
        // Item 999 is not in any catalog; the totals still decide.
        let recipe = Recipe::builder(RecipeId::new(2), ItemId::new(100))
            .discipline(Discipline::Chef)
            .ingredient(ItemId::new(999), 2)
            .build();
        let idx = index(&[("Aria", Discipline::Chef, 10)]);

        assert!(!resolve_recipe(&recipe, &totals(&[]), &idx).has_ingredients);
        assert!(resolve_recipe(&recipe, &totals(&[(999, 2)]), &idx).is_craftable());
    }

    #[test]
    fn test_recipe_without_ingredients_is_always_supplied() {
        let recipe = Recipe::builder(RecipeId::new(3), ItemId::new(100))
            .discipline(Discipline::Scribe)
            .build();
        let verdict = resolve_recipe(&recipe, &totals(&[]), &CapabilityIndex::new());
        assert!(verdict.has_ingredients);
        assert!(verdict.capable_characters.is_empty());
    }

    #[test]
    fn test_resolve_whole_catalog() {
        let catalog = CatalogStore::from_parts(
            vec![],
            vec![
                armor_recipe(),
                Recipe::builder(RecipeId::new(2), ItemId::new(101))
                    .discipline(Discipline::Chef)
                    .ingredient(ItemId::new(6), 1)
                    .build(),
            ],
        );
        let verdicts = resolve(
            &catalog,
            &totals(&[(5, 10)]),
            &index(&[("Aria", Discipline::Armorsmith, 500)]),
        );

        assert_eq!(verdicts.len(), 2);
        assert!(verdicts.is_populated());
        assert!(verdicts.get(RecipeId::new(1)).is_some_and(CraftabilityVerdict::is_craftable));
        assert!(verdicts.get(RecipeId::new(2)).is_some_and(|v| !v.has_ingredients));
        assert_eq!(verdicts.craftable().collect::<Vec<_>>(), vec![RecipeId::new(1)]);
    }

    #[test]
    fn test_resolve_without_inputs_is_not_populated() {
        let catalog = CatalogStore::from_parts(vec![], vec![armor_recipe()]);
        let verdicts = resolve(&catalog, &InventoryTotals::new(), &CapabilityIndex::new());
        assert!(!verdicts.is_populated());
        assert_eq!(verdicts.craftable_count(), 0);
    }

    #[test]
    fn test_ingredient_status_rows() {
        let recipe = Recipe::builder(RecipeId::new(4), ItemId::new(100))
            .discipline(Discipline::Chef)
            .ingredient(ItemId::new(5), 10)
            .ingredient(ItemId::new(6), 1)
            .build();
        let rows = ingredient_status(&recipe, &totals(&[(5, 4), (6, 3)]));

        assert_eq!(rows.len(), 2);
        assert!(!rows[0].is_satisfied());
        assert_eq!(rows[0].missing_count(), 6);
        assert!(rows[1].is_satisfied());
        assert_eq!(rows[1].missing_count(), 0);
    }

    proptest! {
        #[test]
        fn prop_ingredients_monotonic(
            needs in prop::collection::vec((0u32..8, 1u32..50), 0..6),
            held in prop::collection::vec(0u32..100, 8),
            extra in prop::collection::vec(0u32..100, 8),
        ) {
            let mut builder = Recipe::builder(RecipeId::new(1), ItemId::new(100))
                .discipline(Discipline::Chef);
            for &(item, count) in &needs {
                builder = builder.ingredient(ItemId::new(item), count);
            }
            let recipe = builder.build();

            let before: InventoryTotals = held
                .iter()
                .enumerate()
                .map(|(i, &n)| (ItemId::new(i as u32), u64::from(n)))
                .collect();
            let after: InventoryTotals = held
                .iter()
                .zip(&extra)
                .enumerate()
                .map(|(i, (&n, &e))| (ItemId::new(i as u32), u64::from(n) + u64::from(e)))
                .collect();

            if has_ingredients(&recipe, &before) {
                prop_assert!(has_ingredients(&recipe, &after));
            }
        }
    }
}
