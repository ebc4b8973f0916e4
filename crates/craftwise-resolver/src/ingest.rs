//! Normalization of raw collaborator payloads.
//!
//! Account and character sources deliver loosely shaped JSON. Everything
//! downstream works on canonical records, so shape branching happens here
//! and nowhere else. Nothing in this module fails: malformed input is
//! coerced to empty and counted.

use craftwise_common::{CharacterName, ItemId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::capability::{CharacterCraftingProfile, CharacterDetail};
use crate::inventory::{InventoryStack, StorageSource};
use crate::model::Discipline;

/// Why a raw entry was rejected.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Payload was not one of the accepted shapes
    #[error("Expected an array for {0}")]
    NotAnArray(&'static str),

    /// Entry did not match the expected record shape
    #[error("Malformed {what} entry at index {index}: {reason}")]
    Malformed {
        /// Kind of record
        what: &'static str,
        /// Position in the payload
        index: usize,
        /// Deserializer message
        reason: String,
    },

    /// Discipline name that is not recognised
    #[error("Unknown discipline: {0}")]
    UnknownDiscipline(String),
}

/// Result type for ingestion of a single entry.
pub type IngestResult<T> = Result<T, IngestError>;

/// Counters describing one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Records produced.
    pub accepted: usize,
    /// Entries dropped as malformed.
    pub malformed: usize,
    /// Entries dropped for naming an unknown discipline.
    pub unknown_disciplines: usize,
    /// Payload had an unexpected shape and was treated as empty.
    pub coerced_empty: bool,
}

impl IngestStats {
    /// Total number of dropped entries.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.malformed + self.unknown_disciplines
    }

    fn reject(&mut self, error: &IngestError) {
        match error {
            IngestError::UnknownDiscipline(_) => self.unknown_disciplines += 1,
            IngestError::Malformed { .. } => self.malformed += 1,
            IngestError::NotAnArray(_) => self.coerced_empty = true,
        }
    }
}

/// Canonical records plus the stats of the pass that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized<T> {
    /// Records in payload order.
    pub records: Vec<T>,
    /// Pass statistics.
    pub stats: IngestStats,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            stats: IngestStats::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCraftingEntry {
    discipline: String,
    rating: u32,
    #[serde(default)]
    active: bool,
}

#[derive(Debug, Deserialize)]
struct RawStack {
    id: u32,
    count: u32,
}

#[derive(Debug, Deserialize)]
struct RawDetail {
    name: String,
    #[serde(default)]
    profession: String,
}

/// Entries of a crafting payload: a bare array, or an object whose
/// `crafting` field is an array.
fn crafting_entries(value: &Value) -> IngestResult<&[Value]> {
    match value {
        Value::Array(entries) => Ok(entries.as_slice()),
        Value::Object(map) => match map.get("crafting") {
            Some(Value::Array(entries)) => Ok(entries.as_slice()),
            _ => Err(IngestError::NotAnArray("crafting")),
        },
        _ => Err(IngestError::NotAnArray("crafting")),
    }
}

fn parse_profile(
    character: &CharacterName,
    index: usize,
    entry: &Value,
) -> IngestResult<CharacterCraftingProfile> {
    let raw = RawCraftingEntry::deserialize(entry).map_err(|e| IngestError::Malformed {
        what: "crafting",
        index,
        reason: e.to_string(),
    })?;
    let discipline: Discipline = raw
        .discipline
        .parse()
        .map_err(|_| IngestError::UnknownDiscipline(raw.discipline.clone()))?;

    Ok(CharacterCraftingProfile::new(
        character.clone(),
        discipline,
        raw.rating.min(discipline.rating_cap()),
        raw.active,
    ))
}

/// Normalizes a character's crafting payload into profile records.
///
/// Accepts a bare array or `{ "crafting": [...] }`; anything else yields
/// an empty list. Entries naming unknown disciplines are dropped.
#[must_use]
pub fn normalize_crafting(character: &CharacterName, value: &Value) -> Normalized<CharacterCraftingProfile> {
    let mut out = Normalized::default();

    let entries = match crafting_entries(value) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Crafting payload for {} coerced to empty: {}", character, e);
            out.stats.reject(&e);
            return out;
        },
    };

    for (index, entry) in entries.iter().enumerate() {
        match parse_profile(character, index, entry) {
            Ok(profile) => out.records.push(profile),
            Err(e) => {
                warn!("Dropping crafting entry for {}: {}", character, e);
                out.stats.reject(&e);
            },
        }
    }
    out.stats.accepted = out.records.len();
    out
}

/// Normalizes a list of storage slots.
///
/// `null` entries stay as empty slots. Malformed entries also become empty
/// slots so positions are preserved. A non-array payload yields no slots.
#[must_use]
pub fn normalize_slots(value: &Value, source: StorageSource) -> Normalized<Option<InventoryStack>> {
    let mut out = Normalized::default();

    let Value::Array(entries) = value else {
        let error = IngestError::NotAnArray("slots");
        debug!("{:?} payload coerced to empty: {}", source, error);
        out.stats.reject(&error);
        return out;
    };

    out.records = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            if entry.is_null() {
                return None;
            }
            match RawStack::deserialize(entry) {
                Ok(raw) => Some(InventoryStack::new(ItemId::new(raw.id), raw.count, source)),
                Err(e) => {
                    let error = IngestError::Malformed {
                        what: "slot",
                        index,
                        reason: e.to_string(),
                    };
                    warn!("Dropping {:?} slot: {}", source, error);
                    out.stats.reject(&error);
                    None
                },
            }
        })
        .collect();
    out.stats.accepted = out.records.iter().flatten().count();
    out
}

/// Normalizes a roster payload into character names.
///
/// Non-string entries and blank names are dropped; duplicates keep the
/// first occurrence.
#[must_use]
pub fn normalize_roster(value: &Value) -> Normalized<CharacterName> {
    let mut out = Normalized::default();

    let Value::Array(entries) = value else {
        out.stats.reject(&IngestError::NotAnArray("roster"));
        return out;
    };

    for (index, entry) in entries.iter().enumerate() {
        match entry.as_str().map(str::trim) {
            Some(name) if !name.is_empty() => {
                if !out.records.iter().any(|n| n.as_str() == name) {
                    out.records.push(CharacterName::from(name));
                }
            },
            _ => {
                let error = IngestError::Malformed {
                    what: "roster",
                    index,
                    reason: format!("expected a character name, got {entry}"),
                };
                warn!("{}", error);
                out.stats.reject(&error);
            },
        }
    }
    out.stats.accepted = out.records.len();
    out
}

/// Normalizes a character detail payload. Returns `None` if malformed.
#[must_use]
pub fn normalize_detail(value: &Value) -> Option<CharacterDetail> {
    match RawDetail::deserialize(value) {
        Ok(raw) if !raw.name.trim().is_empty() => {
            Some(CharacterDetail::new(raw.name.trim(), raw.profession))
        },
        Ok(_) => None,
        Err(e) => {
            warn!("Dropping character detail: {}", e);
            None
        },
    }
}
