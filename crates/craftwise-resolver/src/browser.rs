//! Browsing state for the recipe list: filters, sort order and page.

use craftwise_common::CharacterName;
use serde::{Deserialize, Serialize};

use crate::model::{Discipline, Rarity};
use crate::query::{
    page_count, query_with, LevelRange, QueryContext, QueryPage, RarityFilter, RecipeFilters,
    RecipeSort, SortKey, TypeFilter, DEFAULT_PAGE_SIZE,
};

/// Filter, sort and paging state of one recipe list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeBrowser {
    filters: RecipeFilters,
    sort: RecipeSort,
    page: usize,
    page_size: usize,
}

impl Default for RecipeBrowser {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl RecipeBrowser {
    /// Creates a browser on page 0 with default filters.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            filters: RecipeFilters::default(),
            sort: RecipeSort::default(),
            page: 0,
            page_size,
        }
    }

    /// Current filters.
    #[must_use]
    pub fn filters(&self) -> &RecipeFilters {
        &self.filters
    }

    /// Current sort order.
    #[must_use]
    pub const fn sort(&self) -> RecipeSort {
        self.sort
    }

    /// Current zero-based page.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Current page size.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Applies a change to the filters. Returns to page 0 if anything changed.
    pub fn update_filters(&mut self, change: impl FnOnce(&mut RecipeFilters)) {
        let before = self.filters.clone();
        change(&mut self.filters);
        if self.filters != before {
            self.page = 0;
        }
    }

    /// Replaces every filter at once.
    pub fn set_filters(&mut self, filters: RecipeFilters) {
        self.update_filters(|f| *f = filters);
    }

    /// Resets every filter to its default.
    pub fn clear_filters(&mut self) {
        self.set_filters(RecipeFilters::default());
    }

    /// Sets the search text.
    pub fn set_search(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.update_filters(|f| f.search = query);
    }

    /// Adds or removes a discipline from the selection.
    pub fn toggle_discipline(&mut self, discipline: Discipline) {
        self.update_filters(|f| {
            if !f.disciplines.remove(&discipline) {
                f.disciplines.insert(discipline);
            }
        });
    }

    /// Sets the rarity filter; `None` clears it.
    pub fn set_rarity(&mut self, rarity: Option<Rarity>) {
        self.update_filters(|f| f.rarity = rarity.map_or(RarityFilter::All, RarityFilter::Only));
    }

    /// Sets the type filter.
    pub fn set_type(&mut self, filter: TypeFilter) {
        self.update_filters(|f| f.recipe_type = filter);
    }

    /// Sets the inclusive rating range.
    pub fn set_level_range(&mut self, min: u32, max: u32) {
        self.update_filters(|f| f.level = LevelRange::new(min, max));
    }

    /// Adds or removes a character from the selection.
    pub fn toggle_character(&mut self, character: impl Into<CharacterName>) {
        let character = character.into();
        self.update_filters(|f| {
            if !f.characters.remove(&character) {
                f.characters.insert(character);
            }
        });
    }

    /// Restricts the default list to craftable recipes.
    pub fn set_craftable_only(&mut self, craftable_only: bool) {
        self.update_filters(|f| f.craftable_only = craftable_only);
    }

    /// Restricts the list to favorites.
    pub fn set_favorites_only(&mut self, favorites_only: bool) {
        self.update_filters(|f| f.favorites_only = favorites_only);
    }

    /// Sets the sort order. The current page is kept.
    pub fn set_sort(&mut self, key: SortKey, descending: bool) {
        self.sort = RecipeSort { key, descending };
    }

    /// Sets the page size and returns to page 0.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page = 0;
    }

    /// Jumps to a page. Out-of-range pages yield empty results.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Moves forward one page if another page exists for `total` rows.
    pub fn next_page(&mut self, total: usize) -> bool {
        if self.page.saturating_add(1) < page_count(total, self.page_size) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Moves back one page if not on the first.
    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Runs the pipeline with the current state.
    #[must_use]
    pub fn query<'a>(&self, ctx: &QueryContext<'a>) -> QueryPage<'a> {
        query_with(ctx, &self.filters, self.sort, self.page, self.page_size)
    }
}
