//! Capability index: which characters can work which discipline, and how well.

use ahash::AHashMap;
use craftwise_common::CharacterName;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Discipline;

/// One discipline a character has ranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterCraftingProfile {
    /// Character holding the rating.
    pub character: CharacterName,
    /// Discipline ranked.
    pub discipline: Discipline,
    /// Current rating, 0-500.
    pub rating: u32,
    /// Whether the discipline is currently equipped. Does not affect craftability.
    pub active: bool,
}

impl CharacterCraftingProfile {
    /// Creates a profile entry.
    #[must_use]
    pub fn new(
        character: impl Into<CharacterName>,
        discipline: Discipline,
        rating: u32,
        active: bool,
    ) -> Self {
        Self {
            character: character.into(),
            discipline,
            rating,
            active,
        }
    }
}

/// Per-character details used only to group characters for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDetail {
    /// Character name.
    pub name: CharacterName,
    /// Profession, e.g. `Guardian`.
    pub profession: String,
}

impl CharacterDetail {
    /// Creates a detail record.
    #[must_use]
    pub fn new(name: impl Into<CharacterName>, profession: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profession: profession.into(),
        }
    }
}

/// A (character, rating) pair in a discipline bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapableCharacter {
    /// Character name.
    pub character: CharacterName,
    /// Rating in the discipline the entry came from.
    pub rating: u32,
}

impl CapableCharacter {
    /// Creates a new entry.
    #[must_use]
    pub fn new(character: impl Into<CharacterName>, rating: u32) -> Self {
        Self {
            character: character.into(),
            rating,
        }
    }
}

/// Discipline-keyed lookup of characters and their ratings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityIndex {
    buckets: AHashMap<Discipline, Vec<CapableCharacter>>,
    characters: Vec<CharacterName>,
}

impl CapabilityIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Characters of a discipline in insertion order; empty if none.
    #[must_use]
    pub fn bucket(&self, discipline: Discipline) -> &[CapableCharacter] {
        self.buckets.get(&discipline).map_or(&[], Vec::as_slice)
    }

    /// A character's rating in a discipline.
    #[must_use]
    pub fn rating_of(&self, character: &str, discipline: Discipline) -> Option<u32> {
        self.bucket(discipline)
            .iter()
            .find(|entry| entry.character.as_str() == character)
            .map(|entry| entry.rating)
    }

    /// Characters that contributed at least one profile, in input order.
    #[must_use]
    pub fn characters(&self) -> &[CharacterName] {
        &self.characters
    }

    /// Returns true if no character has any discipline.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }
}

/// Builds the capability index from per-character profile lists.
///
/// Buckets keep character input order, then profile order. A character
/// listing the same discipline twice keeps the highest rating, at the
/// position of its first entry.
#[must_use]
pub fn build_index<P: AsRef<[CharacterCraftingProfile]>>(
    profiles: &[(CharacterName, P)],
) -> CapabilityIndex {
    let mut index = CapabilityIndex::new();

    for (character, list) in profiles {
        let mut ranked: Vec<(Discipline, u32)> = Vec::new();
        for profile in list.as_ref() {
            match ranked.iter_mut().find(|(d, _)| *d == profile.discipline) {
                Some((_, rating)) => {
                    debug!(
                        "{} lists {} twice ({} and {}); keeping the higher rating",
                        character, profile.discipline, rating, profile.rating
                    );
                    *rating = (*rating).max(profile.rating);
                },
                None => ranked.push((profile.discipline, profile.rating)),
            }
        }

        if ranked.is_empty() {
            continue;
        }
        for (discipline, rating) in ranked {
            index
                .buckets
                .entry(discipline)
                .or_default()
                .push(CapableCharacter::new(character.clone(), rating));
        }
        if !index.characters.contains(character) {
            index.characters.push(character.clone());
        }
    }

    index
}
