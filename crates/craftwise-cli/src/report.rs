//! Rendering of one result page.

use craftwise_common::CharacterName;
use craftwise_resolver::{select, QueryPage, RecipeRow};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write;

/// Display form of one recipe row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRow {
    /// Recipe id.
    pub id: u32,
    /// Output item name.
    pub name: String,
    /// Output rarity, if known.
    pub rarity: Option<String>,
    /// Minimum rating.
    pub min_rating: u32,
    /// Eligible disciplines.
    pub disciplines: Vec<String>,
    /// Whether someone can craft it now.
    pub craftable: bool,
    /// Crafter label such as `Aria (+2)`.
    pub crafter: Option<String>,
    /// Favorited.
    pub favorite: bool,
}

impl PageRow {
    /// Builds a display row.
    #[must_use]
    pub fn from_row(row: &RecipeRow<'_>, preferred: &HashSet<CharacterName>) -> Self {
        Self {
            id: row.recipe.id.raw(),
            name: row.display_name(),
            rarity: row.item.map(|i| i.rarity.to_string()),
            min_rating: row.recipe.min_rating,
            disciplines: row.recipe.disciplines.iter().map(ToString::to_string).collect(),
            craftable: row.verdict.is_some_and(|v| v.is_craftable()),
            crafter: row
                .verdict
                .and_then(|v| select(v, preferred))
                .map(|d| d.label()),
            favorite: row.favorite,
        }
    }
}

/// Display form of a page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    /// Zero-based page index.
    pub page: usize,
    /// Number of pages.
    pub pages: usize,
    /// Size of the filtered set.
    pub total: usize,
    /// Rows on this page.
    pub rows: Vec<PageRow>,
}

impl PageReport {
    /// Builds the report for a page.
    #[must_use]
    pub fn new(page: &QueryPage<'_>, preferred: &HashSet<CharacterName>) -> Self {
        Self {
            page: page.page,
            pages: page.page_count(),
            total: page.total,
            rows: page
                .items
                .iter()
                .map(|row| PageRow::from_row(row, preferred))
                .collect(),
        }
    }

    /// Plain-text table.
    #[must_use]
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>7}  {:<40} {:<10} {:>6}  {:<24} {}",
            "ID", "NAME", "RARITY", "RATING", "DISCIPLINES", "CRAFTER"
        );
        for row in &self.rows {
            let star = if row.favorite { "*" } else { " " };
            let _ = writeln!(
                out,
                "{:>7}{} {:<40} {:<10} {:>6}  {:<24} {}",
                row.id,
                star,
                row.name,
                row.rarity.as_deref().unwrap_or("-"),
                row.min_rating,
                row.disciplines.join(","),
                row.crafter.as_deref().unwrap_or("-"),
            );
        }
        let _ = writeln!(
            out,
            "Page {} of {} ({} recipes)",
            if self.pages == 0 { 0 } else { self.page.saturating_add(1) },
            self.pages,
            self.total
        );
        out
    }
}
