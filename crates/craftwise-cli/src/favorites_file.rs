//! Favorites persisted as a JSON file.

use craftwise_common::{RecipeId, SchemaVersion};
use craftwise_resolver::{FavoritesError, FavoritesResult, FavoritesStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk layout of the favorites file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FavoritesFile {
    version: SchemaVersion,
    favorites: Vec<RecipeId>,
}

/// Favorites store backed by one JSON file.
#[derive(Debug, Clone)]
pub struct FileFavoritesStore {
    path: PathBuf,
}

impl FileFavoritesStore {
    /// Creates a store at `path`. Nothing is read until `load`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FavoritesStore for FileFavoritesStore {
    fn name(&self) -> &str {
        "File"
    }

    fn load(&self) -> FavoritesResult<HashSet<RecipeId>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No favorites file at {}", self.path.display());
                return Ok(HashSet::new());
            },
            Err(e) => return Err(e.into()),
        };

        let file: FavoritesFile = serde_json::from_str(&contents)
            .map_err(|e| FavoritesError::Serialization(e.to_string()))?;
        if !SchemaVersion::FAVORITES.can_read(&file.version) {
            return Err(FavoritesError::VersionMismatch {
                expected: SchemaVersion::FAVORITES.to_string(),
                actual: file.version.to_string(),
            });
        }
        Ok(file.favorites.into_iter().collect())
    }

    fn save(&self, favorites: &HashSet<RecipeId>) -> FavoritesResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut ids: Vec<RecipeId> = favorites.iter().copied().collect();
        ids.sort_unstable();
        let file = FavoritesFile {
            version: SchemaVersion::FAVORITES,
            favorites: ids,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| FavoritesError::Serialization(e.to_string()))?;
        fs::write(&self.path, json)?;

        info!("Saved {} favorites to {}", favorites.len(), self.path.display());
        Ok(())
    }
}
