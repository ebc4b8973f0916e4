//! Favorite recipes and the store they persist through.

use craftwise_common::RecipeId;
use parking_lot::Mutex;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Favorites persistence errors.
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored file written by an incompatible version
    #[error("Favorites version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Version this build reads
        expected: String,
        /// Version found in the store
        actual: String,
    },

    /// Backend-specific failure
    #[error("Favorites backend error: {0}")]
    Backend(String),
}

/// Result type for favorites operations.
pub type FavoritesResult<T> = Result<T, FavoritesError>;

/// Key-value persistence for the favorites set.
pub trait FavoritesStore: Send + Sync {
    /// Backend name.
    fn name(&self) -> &str;

    /// Reads the stored set. A store with nothing saved yields an empty set.
    fn load(&self) -> FavoritesResult<HashSet<RecipeId>>;

    /// Replaces the stored set.
    fn save(&self, favorites: &HashSet<RecipeId>) -> FavoritesResult<()>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryFavoritesStore {
    saved: Mutex<HashSet<RecipeId>>,
}

impl MemoryFavoritesStore {
    /// Creates a store holding `favorites`.
    #[must_use]
    pub fn with_favorites(favorites: impl IntoIterator<Item = RecipeId>) -> Self {
        Self {
            saved: Mutex::new(favorites.into_iter().collect()),
        }
    }
}

impl FavoritesStore for MemoryFavoritesStore {
    fn name(&self) -> &str {
        "Memory"
    }

    fn load(&self) -> FavoritesResult<HashSet<RecipeId>> {
        Ok(self.saved.lock().clone())
    }

    fn save(&self, favorites: &HashSet<RecipeId>) -> FavoritesResult<()> {
        self.saved.lock().clone_from(favorites);
        Ok(())
    }
}

/// The favorites set, written through to its store on every toggle.
pub struct Favorites {
    store: Box<dyn FavoritesStore>,
    ids: HashSet<RecipeId>,
}

impl std::fmt::Debug for Favorites {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Favorites")
            .field("store", &self.store.name())
            .field("ids", &self.ids)
            .finish()
    }
}

impl Favorites {
    /// Reads favorites from `store`.
    pub fn try_open(store: Box<dyn FavoritesStore>) -> FavoritesResult<Self> {
        let ids = store.load()?;
        debug!("Loaded {} favorites from {}", ids.len(), store.name());
        Ok(Self { store, ids })
    }

    /// Reads favorites from `store`, starting empty if it cannot be read.
    #[must_use]
    pub fn open(store: Box<dyn FavoritesStore>) -> Self {
        match store.load() {
            Ok(ids) => {
                debug!("Loaded {} favorites from {}", ids.len(), store.name());
                Self { store, ids }
            },
            Err(e) => {
                warn!("Failed to load favorites from {}: {}", store.name(), e);
                Self {
                    store,
                    ids: HashSet::new(),
                }
            },
        }
    }

    /// Flips a recipe's favorite state and saves.
    ///
    /// Returns the new state. If saving fails the flip is undone.
    pub fn toggle(&mut self, id: RecipeId) -> FavoritesResult<bool> {
        let now_favorite = if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        };

        if let Err(e) = self.store.save(&self.ids) {
            if now_favorite {
                self.ids.remove(&id);
            } else {
                self.ids.insert(id);
            }
            return Err(e);
        }
        Ok(now_favorite)
    }

    /// Checks if a recipe is a favorite.
    #[must_use]
    pub fn contains(&self, id: RecipeId) -> bool {
        self.ids.contains(&id)
    }

    /// The favorite set, for queries.
    #[must_use]
    pub fn ids(&self) -> &HashSet<RecipeId> {
        &self.ids
    }

    /// Number of favorites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if there are no favorites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
