//! Filter and pagination pipeline over the recipe catalog.
//!
//! A query picks a base set (search matches, craftable recipes, or the
//! curated default), narrows it with every active predicate, orders it and
//! slices out one page. Predicates are pure membership tests, so the order
//! they are applied in never changes the result set.

use craftwise_common::{CharacterName, RecipeId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use crate::catalog::CatalogStore;
use crate::model::{Discipline, Item, Rarity, Recipe, MAX_RATING, NOTABLE_RATING};
use crate::resolver::{CraftabilityVerdict, VerdictMap};

/// Shortest search query that activates search.
pub const MIN_SEARCH_LEN: usize = 2;

/// Default number of recipes per page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

// ============================================================================
// Filter values
// ============================================================================

/// Single-select rarity filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RarityFilter {
    /// No filtering.
    #[default]
    All,
    /// Only recipes whose output has this rarity.
    Only(Rarity),
}

/// Named groups of recipe/item type strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeGroup {
    /// Refined materials.
    Refinement,
    /// Intermediate components.
    Component,
    /// Upgrade components.
    Upgrade,
}

impl TypeGroup {
    /// Underlying type strings this group stands for.
    #[must_use]
    pub fn members(self) -> &'static [&'static str] {
        match self {
            Self::Refinement => &["Refinement", "RefinementEctoplasm", "RefinementObsidian"],
            Self::Component => &["Component", "Inscription", "Insignia"],
            Self::Upgrade => &["UpgradeComponent", "Rune", "Sigil"],
        }
    }

    /// Get display name for this group.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Refinement => "Refinement",
            Self::Component => "Component",
            Self::Upgrade => "Upgrade",
        }
    }

    /// Group whose display name matches, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Refinement, Self::Component, Self::Upgrade]
            .into_iter()
            .find(|g| g.display_name().eq_ignore_ascii_case(name))
    }
}

/// Single-select type filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeFilter {
    /// No filtering.
    #[default]
    All,
    /// Any type string in a group.
    Group(TypeGroup),
    /// One type string.
    Exact(String),
}

impl TypeFilter {
    /// Parses a group name or falls back to an exact type string.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else if let Some(group) = TypeGroup::from_name(value) {
            Self::Group(group)
        } else {
            Self::Exact(value.to_string())
        }
    }

    fn accepts(&self, type_name: &str) -> bool {
        if type_name.is_empty() {
            return false;
        }
        match self {
            Self::All => true,
            Self::Group(group) => group
                .members()
                .iter()
                .any(|m| m.eq_ignore_ascii_case(type_name)),
            Self::Exact(expected) => expected.eq_ignore_ascii_case(type_name),
        }
    }
}

/// Inclusive range on a recipe's minimum rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    /// Lowest rating kept.
    pub min: u32,
    /// Highest rating kept.
    pub max: u32,
}

impl LevelRange {
    /// Creates a range. A range with `min > max` keeps nothing.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Returns true if no rating falls in the range.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Checks if a rating falls in the range.
    #[must_use]
    pub fn contains(&self, rating: u32) -> bool {
        (self.min..=self.max).contains(&rating)
    }

    /// Returns true if the range covers every rating.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.min == 0 && self.max >= MAX_RATING
    }
}

impl Default for LevelRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: MAX_RATING,
        }
    }
}

/// Every filter a user can set on the recipe list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFilters {
    /// Search text; active from [`MIN_SEARCH_LEN`] characters.
    pub search: String,
    /// Disciplines to keep (any of). Empty keeps all.
    pub disciplines: BTreeSet<Discipline>,
    /// Output rarity.
    pub rarity: RarityFilter,
    /// Recipe or output item type.
    pub recipe_type: TypeFilter,
    /// Minimum rating range.
    pub level: LevelRange,
    /// Characters to keep (any of capable). Empty keeps all.
    pub characters: BTreeSet<CharacterName>,
    /// Restrict the default base set to craftable recipes.
    pub craftable_only: bool,
    /// Keep only favorited recipes.
    pub favorites_only: bool,
}

impl RecipeFilters {
    /// Trimmed search text if long enough to be active.
    #[must_use]
    pub fn active_search(&self) -> Option<String> {
        let query = self.search.trim();
        (query.chars().count() >= MIN_SEARCH_LEN).then(|| query.to_lowercase())
    }

    /// Predicates for every active narrowing filter.
    #[must_use]
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if !self.disciplines.is_empty() {
            predicates.push(Predicate::Discipline(
                self.disciplines.iter().copied().collect(),
            ));
        }
        if let RarityFilter::Only(rarity) = self.rarity {
            predicates.push(Predicate::Rarity(rarity));
        }
        if self.recipe_type != TypeFilter::All {
            predicates.push(Predicate::Type(self.recipe_type.clone()));
        }
        if !self.level.is_full() {
            predicates.push(Predicate::Level(self.level));
        }
        if !self.characters.is_empty() {
            predicates.push(Predicate::Character(self.characters.clone()));
        }
        if self.favorites_only {
            predicates.push(Predicate::Favorite);
        }
        predicates
    }
}

// ============================================================================
// Sorting
// ============================================================================

/// Field to order results by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// Catalog order, or search relevance while searching.
    #[default]
    Catalog,
    /// Output item name.
    Name,
    /// Minimum rating.
    Rating,
    /// Output rarity.
    Rarity,
}

/// Sort order for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecipeSort {
    /// Field sorted on.
    pub key: SortKey,
    /// Reverse the field order.
    pub descending: bool,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Inputs a query reads besides the filters.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    /// Recipe catalog.
    pub catalog: &'a CatalogStore,
    /// Current verdicts.
    pub verdicts: &'a VerdictMap,
    /// Favorited recipes.
    pub favorites: &'a HashSet<RecipeId>,
}

/// A narrowing filter, tested against one recipe at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Eligible disciplines intersect the set.
    Discipline(Vec<Discipline>),
    /// Output rarity equals; unresolved outputs fail.
    Rarity(Rarity),
    /// Recipe type or output item type accepted.
    Type(TypeFilter),
    /// Minimum rating within range.
    Level(LevelRange),
    /// Capable characters intersect the set.
    Character(BTreeSet<CharacterName>),
    /// Recipe is favorited.
    Favorite,
}

impl Predicate {
    /// Tests a recipe.
    #[must_use]
    pub fn matches(&self, recipe: &Recipe, ctx: &QueryContext<'_>) -> bool {
        match self {
            Self::Discipline(set) => recipe.uses_any_discipline(set),
            Self::Rarity(rarity) => ctx
                .catalog
                .output_item(recipe)
                .is_some_and(|item| item.rarity == *rarity),
            Self::Type(filter) => {
                filter.accepts(&recipe.recipe_type)
                    || ctx
                        .catalog
                        .output_item(recipe)
                        .is_some_and(|item| filter.accepts(&item.item_type))
            },
            Self::Level(range) => range.contains(recipe.min_rating),
            Self::Character(names) => ctx.verdicts.get(recipe.id).is_some_and(|verdict| {
                verdict
                    .capable_characters
                    .iter()
                    .any(|c| names.contains(&c.character))
            }),
            Self::Favorite => ctx.favorites.contains(&recipe.id),
        }
    }
}

/// How well an item name matches a lowercased query; lower is better.
#[must_use]
pub fn search_score(name: &str, query: &str) -> Option<u8> {
    let name = name.to_lowercase();
    if name == query {
        Some(0)
    } else if name.starts_with(query) {
        Some(1)
    } else if name
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word.starts_with(query))
    {
        Some(2)
    } else if name.contains(query) {
        Some(3)
    } else {
        None
    }
}

fn in_default_set(recipe: &Recipe, item: Option<&Item>) -> bool {
    item.is_some_and(|i| i.rarity.is_top_tier()) || recipe.min_rating >= NOTABLE_RATING
}

/// One result row.
#[derive(Debug, Clone, Copy)]
pub struct RecipeRow<'a> {
    /// The recipe.
    pub recipe: &'a Recipe,
    /// Its output item, if the catalog knows it.
    pub item: Option<&'a Item>,
    /// Its verdict, if resolved.
    pub verdict: Option<&'a CraftabilityVerdict>,
    /// Whether the recipe is favorited.
    pub favorite: bool,
}

impl RecipeRow<'_> {
    /// Output item name, or a placeholder for unknown items.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.item
            .map_or_else(|| format!("Unknown item {}", self.recipe.output), |i| i.name.clone())
    }
}

/// One page of results.
#[derive(Debug, Clone)]
pub struct QueryPage<'a> {
    /// Rows on this page.
    pub items: Vec<RecipeRow<'a>>,
    /// Size of the filtered set.
    pub total: usize,
    /// Zero-based page index requested.
    pub page: usize,
    /// Page size requested.
    pub page_size: usize,
}

impl QueryPage<'_> {
    /// Number of pages the filtered set spans.
    #[must_use]
    pub fn page_count(&self) -> usize {
        page_count(self.total, self.page_size)
    }
}

/// Number of pages needed for `total` rows.
#[must_use]
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// Index range of a page, clamped to `total`; empty when out of range.
#[must_use]
pub fn page_bounds(total: usize, page: usize, page_size: usize) -> std::ops::Range<usize> {
    let start = page.saturating_mul(page_size);
    if page_size == 0 || start >= total {
        return 0..0;
    }
    start..start.saturating_add(page_size).min(total)
}

/// Applies base selection and every predicate, returning recipes in result order.
#[must_use]
pub fn filter_recipes<'a>(
    ctx: &QueryContext<'a>,
    filters: &RecipeFilters,
    sort: RecipeSort,
) -> Vec<&'a Recipe> {
    let catalog = ctx.catalog;
    let search = filters.active_search();

    // (recipe, search score, catalog position)
    let mut rows: Vec<(&'a Recipe, u8, usize)> = catalog
        .recipes()
        .enumerate()
        .filter_map(|(pos, recipe)| {
            let item = catalog.output_item(recipe);
            if let Some(query) = &search {
                let score = search_score(&item?.name, query)?;
                Some((recipe, score, pos))
            } else if filters.craftable_only && ctx.verdicts.is_populated() {
                ctx.verdicts
                    .get(recipe.id)
                    .is_some_and(CraftabilityVerdict::is_craftable)
                    .then_some((recipe, 0, pos))
            } else {
                in_default_set(recipe, item).then_some((recipe, 0, pos))
            }
        })
        .collect();

    let predicates = filters.predicates();
    rows.retain(|(recipe, _, _)| predicates.iter().all(|p| p.matches(recipe, ctx)));

    sort_rows(&mut rows, catalog, sort, search.is_some());
    rows.into_iter().map(|(recipe, _, _)| recipe).collect()
}

fn sort_rows(
    rows: &mut [(&Recipe, u8, usize)],
    catalog: &CatalogStore,
    sort: RecipeSort,
    searching: bool,
) {
    let name_of = |r: &Recipe| catalog.output_item(r).map(|i| i.name.to_lowercase());
    let rarity_of = |r: &Recipe| catalog.output_item(r).map(|i| i.rarity);

    rows.sort_by(|a, b| {
        let primary = match sort.key {
            SortKey::Catalog if searching => a.1.cmp(&b.1),
            SortKey::Catalog => Ordering::Equal,
            // Unknown names sort after known ones in either direction.
            SortKey::Name => match (name_of(a.0), name_of(b.0)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortKey::Rating => a.0.min_rating.cmp(&b.0.min_rating),
            SortKey::Rarity => rarity_of(a.0).cmp(&rarity_of(b.0)),
        };
        let primary = if sort.descending {
            primary.reverse()
        } else {
            primary
        };
        primary.then(a.2.cmp(&b.2))
    });
}

/// Runs a query with favorites and sort order.
#[must_use]
pub fn query_with<'a>(
    ctx: &QueryContext<'a>,
    filters: &RecipeFilters,
    sort: RecipeSort,
    page: usize,
    page_size: usize,
) -> QueryPage<'a> {
    let matched = filter_recipes(ctx, filters, sort);
    let total = matched.len();
    let items = matched[page_bounds(total, page, page_size)]
        .iter()
        .map(|&recipe| RecipeRow {
            recipe,
            item: ctx.catalog.output_item(recipe),
            verdict: ctx.verdicts.get(recipe.id),
            favorite: ctx.favorites.contains(&recipe.id),
        })
        .collect();

    QueryPage {
        items,
        total,
        page,
        page_size,
    }
}

/// Runs a query in catalog order with no favorites.
#[must_use]
pub fn query<'a>(
    catalog: &'a CatalogStore,
    verdicts: &'a VerdictMap,
    filters: &RecipeFilters,
    page: usize,
    page_size: usize,
) -> QueryPage<'a> {
    static NO_FAVORITES: std::sync::OnceLock<HashSet<RecipeId>> = std::sync::OnceLock::new();
    let ctx = QueryContext {
        catalog,
        verdicts,
        favorites: NO_FAVORITES.get_or_init(HashSet::new),
    };
    query_with(&ctx, filters, RecipeSort::default(), page, page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{build_index, CharacterCraftingProfile};
    use crate::inventory::InventoryTotals;
    use crate::resolver::resolve;
    use craftwise_common::ItemId;
    use proptest::prelude::*;

    fn fixture() -> CatalogStore {
        let items = vec![
            Item::new(ItemId::new(1), "Mithril Ingot", Rarity::Basic).with_type("CraftingMaterial"),
            Item::new(ItemId::new(2), "Dawn", Rarity::Exotic).with_type("Weapon"),
            Item::new(ItemId::new(3), "Sunrise", Rarity::Legendary).with_type("Weapon"),
            Item::new(ItemId::new(4), "Superior Rune of Water", Rarity::Exotic)
                .with_type("UpgradeComponent"),
            Item::new(ItemId::new(5), "Bowl of Fire Meat Chili", Rarity::Fine)
                .with_type("Consumable"),
            Item::new(ItemId::new(6), "Vision Crystal", Rarity::Ascended)
                .with_type("CraftingMaterial"),
        ];
        let recipes = vec![
            Recipe::builder(RecipeId::new(1), ItemId::new(1))
                .recipe_type("Refinement")
                .discipline(Discipline::Weaponsmith)
                .discipline(Discipline::Armorsmith)
                .min_rating(225)
                .ingredient(ItemId::new(100), 2)
                .build(),
            Recipe::builder(RecipeId::new(2), ItemId::new(2))
                .recipe_type("Greatsword")
                .discipline(Discipline::Weaponsmith)
                .min_rating(400)
                .ingredient(ItemId::new(1), 10)
                .build(),
            Recipe::builder(RecipeId::new(3), ItemId::new(3))
                .recipe_type("Greatsword")
                .discipline(Discipline::Weaponsmith)
                .min_rating(400)
                .ingredient(ItemId::new(2), 1)
                .build(),
            Recipe::builder(RecipeId::new(4), ItemId::new(4))
                .recipe_type("Rune")
                .discipline(Discipline::Artificer)
                .min_rating(450)
                .build(),
            Recipe::builder(RecipeId::new(5), ItemId::new(5))
                .recipe_type("Meal")
                .discipline(Discipline::Chef)
                .min_rating(300)
                .build(),
            Recipe::builder(RecipeId::new(6), ItemId::new(6))
                .recipe_type("Refinement")
                .discipline(Discipline::Artificer)
                .discipline(Discipline::Jeweler)
                .min_rating(400)
                .build(),
            // Output unknown to the catalog.
            Recipe::builder(RecipeId::new(7), ItemId::new(77))
                .recipe_type("Component")
                .discipline(Discipline::Tailor)
                .min_rating(450)
                .build(),
        ];
        CatalogStore::from_parts(items, recipes)
    }

    fn verdicts(catalog: &CatalogStore) -> VerdictMap {
        let totals: InventoryTotals = [(ItemId::new(100), 50u64), (ItemId::new(1), 10)]
            .into_iter()
            .collect();
        let index = build_index(&[
            (
                CharacterName::from("Aria"),
                vec![CharacterCraftingProfile::new(
                    "Aria",
                    Discipline::Weaponsmith,
                    500,
                    true,
                )],
            ),
            (
                CharacterName::from("Bram"),
                vec![CharacterCraftingProfile::new("Bram", Discipline::Chef, 400, true)],
            ),
        ]);
        resolve(catalog, &totals, &index)
    }

    fn ids(page: &QueryPage<'_>) -> Vec<u32> {
        page.items.iter().map(|row| row.recipe.id.raw()).collect()
    }

    #[test]
    fn test_default_set_is_top_tier_or_high_rating() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let page = query(&catalog, &verdicts, &RecipeFilters::default(), 0, 25);
        // 1 (225, basic) and 5 (300, fine) are left out.
        assert_eq!(ids(&page), vec![2, 3, 4, 6, 7]);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_craftable_only_base_set() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let filters = RecipeFilters {
            craftable_only: true,
            ..RecipeFilters::default()
        };
        let page = query(&catalog, &verdicts, &filters, 0, 25);
        assert_eq!(ids(&page), vec![1, 2, 5]);
    }

    #[test]
    fn test_craftable_only_without_data_falls_back() {
        let catalog = fixture();
        let empty = VerdictMap::new();
        let filters = RecipeFilters {
            craftable_only: true,
            ..RecipeFilters::default()
        };
        let page = query(&catalog, &empty, &filters, 0, 25);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_search_replaces_base_set() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        // Chili is neither top tier nor high rating, yet search finds it.
        let chili = RecipeFilters {
            search: "  chili ".to_string(),
            ..RecipeFilters::default()
        };
        assert_eq!(ids(&query(&catalog, &verdicts, &chili, 0, 25)), vec![5]);

        // Sunrise is not craftable; craftable_only is ignored while searching.
        let sunrise = RecipeFilters {
            search: "sun".to_string(),
            craftable_only: true,
            ..RecipeFilters::default()
        };
        assert_eq!(ids(&query(&catalog, &verdicts, &sunrise, 0, 25)), vec![3]);
    }

    #[test]
    fn test_short_search_is_ignored() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let filters = RecipeFilters {
            search: "d".to_string(),
            ..RecipeFilters::default()
        };
        assert_eq!(query(&catalog, &verdicts, &filters, 0, 25).total, 5);
    }

    #[test]
    fn test_search_ranks_exact_then_prefix() {
        let items = vec![
            Item::new(ItemId::new(1), "Iron Dawn Shard", Rarity::Fine),
            Item::new(ItemId::new(2), "Dawn", Rarity::Fine),
            Item::new(ItemId::new(3), "Dawnbreaker", Rarity::Fine),
            Item::new(ItemId::new(4), "Sundawn", Rarity::Fine),
        ];
        let recipes = (1..=4)
            .map(|n| {
                Recipe::builder(RecipeId::new(n), ItemId::new(n))
                    .discipline(Discipline::Huntsman)
                    .build()
            })
            .collect();
        let catalog = CatalogStore::from_parts(items, recipes);
        let filters = RecipeFilters {
            search: "DAWN".to_string(),
            ..RecipeFilters::default()
        };
        let empty = VerdictMap::new();
        let page = query(&catalog, &empty, &filters, 0, 25);
        assert_eq!(ids(&page), vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_discipline_filter() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let filters = RecipeFilters {
            disciplines: [Discipline::Artificer, Discipline::Tailor].into_iter().collect(),
            ..RecipeFilters::default()
        };
        assert_eq!(ids(&query(&catalog, &verdicts, &filters, 0, 25)), vec![4, 6, 7]);
    }

    #[test]
    fn test_rarity_filter_excludes_unknown_items() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let filters = RecipeFilters {
            rarity: RarityFilter::Only(Rarity::Exotic),
            ..RecipeFilters::default()
        };
        assert_eq!(ids(&query(&catalog, &verdicts, &filters, 0, 25)), vec![2, 4]);
    }

    #[test]
    fn test_type_filter_groups() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let upgrade = RecipeFilters {
            recipe_type: TypeFilter::Group(TypeGroup::Upgrade),
            ..RecipeFilters::default()
        };
        assert_eq!(ids(&query(&catalog, &verdicts, &upgrade, 0, 25)), vec![4]);

        let refinement = RecipeFilters {
            recipe_type: TypeFilter::parse("refinement"),
            ..RecipeFilters::default()
        };
        assert_eq!(ids(&query(&catalog, &verdicts, &refinement, 0, 25)), vec![6]);

        let exact = RecipeFilters {
            recipe_type: TypeFilter::parse("Weapon"),
            ..RecipeFilters::default()
        };
        assert_eq!(ids(&query(&catalog, &verdicts, &exact, 0, 25)), vec![2, 3]);
    }

    #[test]
    fn test_level_range_inclusive() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let filters = RecipeFilters {
            level: LevelRange::new(400, 450),
            ..RecipeFilters::default()
        };
        assert_eq!(ids(&query(&catalog, &verdicts, &filters, 0, 25)), vec![2, 3, 4, 6, 7]);

        let reversed = RecipeFilters {
            level: LevelRange::new(450, 400),
            ..RecipeFilters::default()
        };
        assert!(reversed.level.is_empty());
        assert_eq!(query(&catalog, &verdicts, &reversed, 0, 25).total, 0);

        let narrow = RecipeFilters {
            level: LevelRange::new(401, 450),
            ..RecipeFilters::default()
        };
        assert_eq!(ids(&query(&catalog, &verdicts, &narrow, 0, 25)), vec![4, 7]);
    }

    #[test]
    fn test_character_filter() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let filters = RecipeFilters {
            craftable_only: true,
            characters: [CharacterName::from("Bram")].into_iter().collect(),
            ..RecipeFilters::default()
        };
        assert_eq!(ids(&query(&catalog, &verdicts, &filters, 0, 25)), vec![5]);
    }

    #[test]
    fn test_favorites_only() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let favorites: HashSet<RecipeId> = [RecipeId::new(3), RecipeId::new(5)].into();
        let ctx = QueryContext {
            catalog: &catalog,
            verdicts: &verdicts,
            favorites: &favorites,
        };
        let filters = RecipeFilters {
            favorites_only: true,
            ..RecipeFilters::default()
        };
        let page = query_with(&ctx, &filters, RecipeSort::default(), 0, 25);
        assert_eq!(ids(&page), vec![3]);
        assert!(page.items[0].favorite);
    }

    #[test]
    fn test_sort_by_rating_descending_is_stable() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let favorites = HashSet::new();
        let ctx = QueryContext {
            catalog: &catalog,
            verdicts: &verdicts,
            favorites: &favorites,
        };
        let sort = RecipeSort {
            key: SortKey::Rating,
            descending: true,
        };
        let page = query_with(&ctx, &RecipeFilters::default(), sort, 0, 25);
        assert_eq!(ids(&page), vec![4, 7, 2, 3, 6]);
    }

    #[test]
    fn test_sort_by_name_puts_unknown_last() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let favorites = HashSet::new();
        let ctx = QueryContext {
            catalog: &catalog,
            verdicts: &verdicts,
            favorites: &favorites,
        };
        let sort = RecipeSort {
            key: SortKey::Name,
            descending: true,
        };
        let page = query_with(&ctx, &RecipeFilters::default(), sort, 0, 25);
        assert_eq!(ids(&page), vec![6, 4, 3, 2, 7]);
        assert_eq!(page.items[4].display_name(), "Unknown item 77");
    }

    #[test]
    fn test_filter_order_independence() {
        let catalog = fixture();
        let verdicts = verdicts(&catalog);
        let favorites = HashSet::new();
        let ctx = QueryContext {
            catalog: &catalog,
            verdicts: &verdicts,
            favorites: &favorites,
        };
        let discipline = Predicate::Discipline(vec![Discipline::Weaponsmith, Discipline::Artificer]);
        let rarity = Predicate::Rarity(Rarity::Exotic);

        let apply = |order: [&Predicate; 2]| -> Vec<RecipeId> {
            let mut set: Vec<&Recipe> = catalog.recipes().collect();
            for predicate in order {
                set.retain(|r| predicate.matches(r, &ctx));
            }
            set.iter().map(|r| r.id).collect()
        };

        let forward = apply([&discipline, &rarity]);
        let backward = apply([&rarity, &discipline]);
        assert_eq!(forward, backward);
        assert_eq!(forward, vec![RecipeId::new(2), RecipeId::new(4)]);
    }

    #[test]
    fn test_pagination_boundary() {
        let recipes = (0..47)
            .map(|n| {
                Recipe::builder(RecipeId::new(n), ItemId::new(n))
                    .discipline(Discipline::Scribe)
                    .min_rating(400)
                    .build()
            })
            .collect();
        let catalog = CatalogStore::from_parts(vec![], recipes);
        let verdicts = VerdictMap::new();
        let filters = RecipeFilters::default();

        let first = query(&catalog, &verdicts, &filters, 0, 25);
        assert_eq!(first.items.len(), 25);
        assert_eq!(first.page_count(), 2);

        let second = query(&catalog, &verdicts, &filters, 1, 25);
        assert_eq!(second.items.len(), 22);
        assert_eq!(second.total, 47);

        let third = query(&catalog, &verdicts, &filters, 2, 25);
        assert!(third.items.is_empty());
        assert_eq!(third.total, 47);

        assert!(query(&catalog, &verdicts, &filters, usize::MAX, 25).items.is_empty());
        assert!(query(&catalog, &verdicts, &filters, 0, 0).items.is_empty());
    }

    fn filters_strategy() -> impl Strategy<Value = RecipeFilters> {
        (
            prop::sample::subsequence(Discipline::all().to_vec(), 0..4),
            prop::option::of(prop::sample::select(Rarity::all().to_vec())),
            prop::option::of(prop::sample::select(vec![
                TypeGroup::Refinement,
                TypeGroup::Component,
                TypeGroup::Upgrade,
            ])),
            0u32..=500,
            0u32..=500,
            any::<bool>(),
        )
            .prop_map(|(disciplines, rarity, group, lo, hi, craftable_only)| RecipeFilters {
                disciplines: disciplines.into_iter().collect(),
                rarity: rarity.map_or(RarityFilter::All, RarityFilter::Only),
                recipe_type: group.map_or(TypeFilter::All, TypeFilter::Group),
                level: LevelRange::new(lo, hi),
                craftable_only,
                ..RecipeFilters::default()
            })
    }

    proptest! {
        #[test]
        fn prop_predicate_order_does_not_matter(filters in filters_strategy()) {
            let catalog = fixture();
            let verdicts = verdicts(&catalog);
            let favorites = HashSet::new();
            let ctx = QueryContext {
                catalog: &catalog,
                verdicts: &verdicts,
                favorites: &favorites,
            };

            let expected: Vec<RecipeId> = filter_recipes(&ctx, &filters, RecipeSort::default())
                .iter()
                .map(|r| r.id)
                .collect();

            let base = RecipeFilters {
                craftable_only: filters.craftable_only,
                ..RecipeFilters::default()
            };
            let mut reversed = filter_recipes(&ctx, &base, RecipeSort::default());
            for predicate in filters.predicates().iter().rev() {
                reversed.retain(|r| predicate.matches(r, &ctx));
            }
            let reversed: Vec<RecipeId> = reversed.iter().map(|r| r.id).collect();

            prop_assert_eq!(expected, reversed);
        }
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(47, 1, 25), 25..47);
        assert_eq!(page_bounds(47, 2, 25), 0..0);
        assert_eq!(page_bounds(0, 0, 25), 0..0);
        assert_eq!(page_count(50, 25), 2);
        assert_eq!(page_count(51, 25), 3);
        assert_eq!(page_count(10, 0), 0);
    }
}
