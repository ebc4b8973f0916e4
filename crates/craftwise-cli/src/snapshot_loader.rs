//! Snapshot loading from a data directory.
//!
//! This module provides:
//! - Reading the catalog, account and character JSON files
//! - Recipe validation on load
//! - Publishing each file's contents to a session as a source event
//!
//! Layout of a data directory:
//!
//! ```text
//! items.json                       array of items
//! recipes.json                     array of recipe definitions
//! materials.json                   array of stacks
//! bank.json                        array of stacks or null slots
//! shared.json                      array of stacks or null slots
//! characters.json                  array of names
//! characters/<name>.crafting.json  bare array or { "crafting": [...] }
//! characters/<name>.bags.json      array of stacks or null slots
//! characters/<name>.json           { "name", "profession" }
//! ```
//!
//! Any file may be missing; its source simply stays unresolved. Character
//! names that are not a single plain path component are skipped.

use craftwise_common::{CatalogError, CharacterName, ItemId, RecipeId};
use craftwise_resolver::{
    normalize_crafting, normalize_detail, normalize_roster, normalize_slots, Discipline, Item,
    Recipe, Session, SourceEvent, StorageKey, StorageSource,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Items file name.
pub const ITEMS_FILE: &str = "items.json";
/// Recipes file name.
pub const RECIPES_FILE: &str = "recipes.json";
/// Material storage file name.
pub const MATERIALS_FILE: &str = "materials.json";
/// Bank file name.
pub const BANK_FILE: &str = "bank.json";
/// Shared inventory file name.
pub const SHARED_FILE: &str = "shared.json";
/// Roster file name.
pub const ROSTER_FILE: &str = "characters.json";
/// Per-character directory name.
pub const CHARACTERS_DIR: &str = "characters";

/// Errors that can occur while loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotLoadError {
    /// Data directory does not exist.
    #[error("Data directory not found: {0}")]
    DataDirNotFound(PathBuf),

    /// Failed to read a file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File read
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// File is not valid JSON.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// File parsed
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Recipe failed validation.
    #[error("Recipe validation error: {0}")]
    Validation(#[from] CatalogError),
}

/// Result type for snapshot loading operations.
pub type SnapshotLoadResult<T> = Result<T, SnapshotLoadError>;

/// A recipe ingredient from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientDefinition {
    /// Item id.
    pub item_id: u32,
    /// Quantity required.
    pub count: u32,
}

/// A recipe definition loaded from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDefinition {
    /// Unique recipe identifier.
    pub id: u32,
    /// Item produced.
    pub output_item_id: u32,
    /// Quantity produced.
    #[serde(default = "default_output_count")]
    pub output_item_count: u32,
    /// Recipe type, e.g. `Refinement`.
    #[serde(rename = "type", default)]
    pub recipe_type: String,
    /// Eligible discipline names.
    #[serde(default)]
    pub disciplines: Vec<String>,
    /// Minimum rating.
    #[serde(default)]
    pub min_rating: u32,
    /// Ingredients consumed.
    #[serde(default)]
    pub ingredients: Vec<IngredientDefinition>,
    /// Craft time in milliseconds.
    #[serde(default)]
    pub time_to_craft_ms: u32,
}

const fn default_output_count() -> u32 {
    1
}

impl RecipeDefinition {
    /// Validates the definition and converts it to a catalog recipe.
    ///
    /// Unknown discipline names are dropped; a recipe left with no
    /// discipline is rejected.
    pub fn to_recipe(&self) -> SnapshotLoadResult<Recipe> {
        let mut builder = Recipe::builder(RecipeId::new(self.id), ItemId::new(self.output_item_id))
            .output_count(self.output_item_count)
            .recipe_type(self.recipe_type.clone())
            .min_rating(self.min_rating)
            .craft_time_ms(self.time_to_craft_ms);

        for name in &self.disciplines {
            match name.parse::<Discipline>() {
                Ok(discipline) => builder = builder.discipline(discipline),
                Err(e) => warn!("Recipe {}: {}", self.id, e),
            }
        }
        for ingredient in &self.ingredients {
            builder = builder.ingredient(ItemId::new(ingredient.item_id), ingredient.count);
        }

        Ok(builder.try_build()?)
    }
}

/// Counters from one snapshot load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Items accepted.
    pub items: usize,
    /// Items skipped as malformed.
    pub skipped_items: usize,
    /// Recipes accepted.
    pub recipes: usize,
    /// Recipes skipped as malformed or invalid.
    pub skipped_recipes: usize,
    /// Non-empty storage slots.
    pub stacks: usize,
    /// Characters in the roster.
    pub characters: usize,
    /// Characters whose crafting file was found.
    pub profiles: usize,
    /// Roster names skipped because they cannot name a file.
    pub rejected_characters: Vec<CharacterName>,
    /// Events the bus refused.
    pub dropped_events: usize,
    /// Files that were absent or unreadable.
    pub missing_files: Vec<PathBuf>,
}

/// Reads a data directory and feeds it to a session.
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    data_dir: PathBuf,
}

impl SnapshotLoader {
    /// Creates a loader for `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Returns the data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Reads and parses one JSON file. `Ok(None)` if it does not exist.
    pub fn read_json(path: &Path) -> SnapshotLoadResult<Option<Value>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SnapshotLoadError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            },
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| SnapshotLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Reads a file, logging and recording it as missing on any failure.
    fn read_optional(path: &Path, stats: &mut LoadStats) -> Option<Value> {
        match Self::read_json(path) {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                debug!("{} not present", path.display());
                stats.missing_files.push(path.to_path_buf());
                None
            },
            Err(e) => {
                warn!("{e}");
                stats.missing_files.push(path.to_path_buf());
                None
            },
        }
    }

    /// Parses items one by one, skipping malformed entries.
    pub fn parse_items(value: &Value, stats: &mut LoadStats) -> Vec<Item> {
        let Value::Array(entries) = value else {
            warn!("Items file is not an array");
            return Vec::new();
        };
        let items: Vec<Item> = entries
            .iter()
            .filter_map(|entry| match Item::deserialize(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Skipping item: {e}");
                    stats.skipped_items += 1;
                    None
                },
            })
            .collect();
        stats.items = items.len();
        items
    }

    /// Parses and validates recipe definitions, skipping invalid entries.
    pub fn parse_recipes(value: &Value, stats: &mut LoadStats) -> Vec<Recipe> {
        let Value::Array(entries) = value else {
            warn!("Recipes file is not an array");
            return Vec::new();
        };
        let recipes: Vec<Recipe> = entries
            .iter()
            .filter_map(|entry| {
                let parsed = RecipeDefinition::deserialize(entry)
                    .map_err(|e| e.to_string())
                    .and_then(|def| def.to_recipe().map_err(|e| e.to_string()));
                match parsed {
                    Ok(recipe) => Some(recipe),
                    Err(e) => {
                        warn!("Skipping recipe: {e}");
                        stats.skipped_recipes += 1;
                        None
                    },
                }
            })
            .collect();
        stats.recipes = recipes.len();
        recipes
    }

    /// Loads every file present and publishes it to `session`, pumping
    /// whenever the bus fills up and once at the end.
    pub fn load_into(&self, session: &Session) -> SnapshotLoadResult<LoadStats> {
        if !self.data_dir.is_dir() {
            return Err(SnapshotLoadError::DataDirNotFound(self.data_dir.clone()));
        }
        info!("Loading snapshot from {}", self.data_dir.display());
        let mut stats = LoadStats::default();

        let recipes = Self::read_optional(&self.data_dir.join(RECIPES_FILE), &mut stats);
        let items = Self::read_optional(&self.data_dir.join(ITEMS_FILE), &mut stats);
        if let Some(recipes) = recipes {
            let recipes = Self::parse_recipes(&recipes, &mut stats);
            let items = items
                .map(|v| Self::parse_items(&v, &mut stats))
                .unwrap_or_default();
            publish(session, SourceEvent::CatalogLoaded { items, recipes }, &mut stats);
        }

        for (file, source) in [
            (MATERIALS_FILE, StorageSource::Materials),
            (BANK_FILE, StorageSource::Bank),
            (SHARED_FILE, StorageSource::SharedInventory),
        ] {
            let path = self.data_dir.join(file);
            Self::load_storage(session, &path, StorageKey::account(source), &mut stats);
        }

        if let Some(value) = Self::read_optional(&self.data_dir.join(ROSTER_FILE), &mut stats) {
            let characters = normalize_roster(&value).records;
            stats.characters = characters.len();
            publish(
                session,
                SourceEvent::RosterArrived {
                    characters: characters.clone(),
                },
                &mut stats,
            );
            for character in &characters {
                self.load_character(session, character, &mut stats);
            }
        }

        session.pump();
        info!(
            "Snapshot loaded: {} items, {} recipes ({} skipped), {} stacks, {} characters",
            stats.items, stats.recipes, stats.skipped_recipes, stats.stacks, stats.characters
        );
        if stats.dropped_events > 0 {
            warn!("{} source events were dropped", stats.dropped_events);
        }
        Ok(stats)
    }

    fn load_storage(session: &Session, path: &Path, key: StorageKey, stats: &mut LoadStats) {
        if let Some(value) = Self::read_optional(path, stats) {
            let slots = normalize_slots(&value, key.source).records;
            stats.stacks += slots.iter().flatten().count();
            publish(session, SourceEvent::StorageArrived { key, slots }, stats);
        }
    }

    fn load_character(&self, session: &Session, character: &CharacterName, stats: &mut LoadStats) {
        if !is_plain_file_stem(character.as_str()) {
            warn!("Skipping character {:?}: name cannot be used as a file name", character.as_str());
            stats.rejected_characters.push(character.clone());
            return;
        }
        let dir = self.data_dir.join(CHARACTERS_DIR);

        let crafting_path = dir.join(format!("{character}.crafting.json"));
        if let Some(value) = Self::read_optional(&crafting_path, stats) {
            let ticket = session.request_profile(character.clone());
            let profiles = normalize_crafting(character, &value).records;
            stats.profiles += 1;
            publish(session, SourceEvent::ProfileArrived { ticket, profiles }, stats);
        }

        let bags_path = dir.join(format!("{character}.bags.json"));
        Self::load_storage(session, &bags_path, StorageKey::bags(character.clone()), stats);

        let detail_path = dir.join(format!("{character}.json"));
        if let Some(detail) =
            Self::read_optional(&detail_path, stats).and_then(|v| normalize_detail(&v))
        {
            publish(session, SourceEvent::DetailArrived { detail }, stats);
        }
    }
}

/// True if `name` is exactly one normal path component.
fn is_plain_file_stem(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Publishes an event, draining the bus first if it is full.
fn publish(session: &Session, event: SourceEvent, stats: &mut LoadStats) {
    let bus = session.bus();
    if bus.pending_count() >= bus.capacity() {
        session.pump();
    }
    if !bus.publish(event) {
        stats.dropped_events += 1;
    }
}
