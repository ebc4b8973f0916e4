//! Reactive session: input snapshots in, derived snapshots out.
//!
//! The session owns the latest snapshot of every source. Whenever a pump
//! applies at least one event, totals, index and verdicts are rebuilt from
//! scratch into a new [`Derived`] value and swapped in behind an `Arc`.
//! Readers holding an older `Arc` keep a consistent view.

use ahash::AHashMap;
use craftwise_common::{CharacterName, RecipeId};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::capability::{build_index, CapabilityIndex, CharacterCraftingProfile, CharacterDetail};
use crate::catalog::CatalogStore;
use crate::events::{ProfileTicket, SourceBus, SourceEvent};
use crate::inventory::{aggregate, InventoryStack, InventoryTotals, StorageKey};
use crate::query::QueryContext;
use crate::resolver::{resolve, VerdictMap};

/// Derived structures computed from one set of inputs.
#[derive(Debug, Default)]
pub struct Derived {
    /// Catalog the verdicts were computed against.
    pub catalog: Arc<CatalogStore>,
    /// Aggregated inventory.
    pub totals: InventoryTotals,
    /// Capability index.
    pub index: CapabilityIndex,
    /// Per-recipe verdicts.
    pub verdicts: VerdictMap,
    /// Number of recomputes that led to this snapshot.
    pub revision: u64,
}

impl Derived {
    /// Query context over this snapshot.
    #[must_use]
    pub fn query_context<'a>(&'a self, favorites: &'a HashSet<RecipeId>) -> QueryContext<'a> {
        QueryContext {
            catalog: &self.catalog,
            verdicts: &self.verdicts,
            favorites,
        }
    }
}

/// Characters sharing a profession, for display grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterGroup {
    /// Profession, `None` while details are unresolved.
    pub profession: Option<String>,
    /// Characters in roster order.
    pub characters: Vec<CharacterName>,
}

/// Outcome of one [`Session::pump`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Events applied to the inputs.
    pub applied: usize,
    /// Events dropped as stale or not applicable.
    pub dropped: usize,
    /// Whether derived state was rebuilt.
    pub recomputed: bool,
}

#[derive(Debug, Default)]
struct Inputs {
    catalog: Arc<CatalogStore>,
    storage: AHashMap<StorageKey, Vec<Option<InventoryStack>>>,
    roster: Option<Vec<CharacterName>>,
    /// Arrival order; reordered by roster when building the index.
    profiles: Vec<(CharacterName, Vec<CharacterCraftingProfile>)>,
    details: AHashMap<CharacterName, CharacterDetail>,
    tickets: AHashMap<CharacterName, u64>,
    next_generation: u64,
    revision: u64,
}

impl Inputs {
    fn in_roster(&self, character: &CharacterName) -> bool {
        self.roster
            .as_ref()
            .map_or(true, |roster| roster.contains(character))
    }

    /// Applies one event. Returns false if it was dropped.
    fn apply(&mut self, event: SourceEvent) -> bool {
        match event {
            SourceEvent::CatalogLoaded { items, recipes } => {
                let catalog = CatalogStore::from_parts(items, recipes);
                let stats = catalog.stats();
                info!(
                    "Catalog loaded: {} items, {} recipes ({} output collisions)",
                    stats.items, stats.recipes, stats.output_collisions
                );
                self.catalog = Arc::new(catalog);
                true
            },
            SourceEvent::StorageArrived { key, slots } => {
                if let Some(owner) = &key.owner {
                    if !self.in_roster(owner) {
                        debug!("Dropping {}: not in roster", key);
                        return false;
                    }
                }
                debug!("{} arrived with {} slots", key, slots.len());
                self.storage.insert(key, slots);
                true
            },
            SourceEvent::RosterArrived { characters } => {
                self.profiles.retain(|(name, _)| characters.contains(name));
                self.details.retain(|name, _| characters.contains(name));
                self.tickets.retain(|name, _| characters.contains(name));
                self.storage.retain(|key, _| {
                    key.owner.as_ref().map_or(true, |owner| characters.contains(owner))
                });
                info!("Roster arrived with {} characters", characters.len());
                self.roster = Some(characters);
                true
            },
            SourceEvent::ProfileArrived { ticket, profiles } => {
                let latest = self.tickets.get(&ticket.character).copied();
                if latest != Some(ticket.generation) {
                    debug!(
                        "Dropping stale profile for {} (generation {}, latest {:?})",
                        ticket.character, ticket.generation, latest
                    );
                    return false;
                }
                if !self.in_roster(&ticket.character) {
                    debug!("Dropping profile for {}: not in roster", ticket.character);
                    return false;
                }
                match self.profiles.iter_mut().find(|(n, _)| *n == ticket.character) {
                    Some((_, existing)) => *existing = profiles,
                    None => self.profiles.push((ticket.character, profiles)),
                }
                true
            },
            SourceEvent::DetailArrived { detail } => {
                if !self.in_roster(&detail.name) {
                    debug!("Dropping detail for {}: not in roster", detail.name);
                    return false;
                }
                self.details.insert(detail.name.clone(), detail);
                true
            },
        }
    }

    fn derive(&mut self) -> Derived {
        let sources: Vec<&Vec<Option<InventoryStack>>> = self.storage.values().collect();
        let totals = aggregate(&sources);

        let ordered: Vec<(CharacterName, &[CharacterCraftingProfile])> = match &self.roster {
            Some(roster) => roster
                .iter()
                .filter_map(|name| {
                    self.profiles
                        .iter()
                        .find(|(n, _)| n == name)
                        .map(|(n, p)| (n.clone(), p.as_slice()))
                })
                .collect(),
            None => self
                .profiles
                .iter()
                .map(|(n, p)| (n.clone(), p.as_slice()))
                .collect(),
        };
        let index = build_index(&ordered);
        let verdicts = resolve(&self.catalog, &totals, &index);

        self.revision += 1;
        debug!(
            "Recomputed revision {}: {} items held, {} characters indexed, {} craftable",
            self.revision,
            totals.len(),
            index.characters().len(),
            verdicts.craftable_count()
        );

        Derived {
            catalog: Arc::clone(&self.catalog),
            totals,
            index,
            verdicts,
            revision: self.revision,
        }
    }
}

/// One account's crafting session.
///
/// Shareable across threads: collaborators publish through [`Session::bus`]
/// while readers take [`Session::snapshot`].
#[derive(Debug)]
pub struct Session {
    bus: SourceBus,
    inputs: Mutex<Inputs>,
    derived: RwLock<Arc<Derived>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SourceBus::default())
    }
}

impl Session {
    /// Creates an empty session listening on `bus`.
    #[must_use]
    pub fn new(bus: SourceBus) -> Self {
        Self {
            bus,
            inputs: Mutex::new(Inputs::default()),
            derived: RwLock::new(Arc::new(Derived::default())),
        }
    }

    /// Bus collaborators publish to.
    #[must_use]
    pub fn bus(&self) -> &SourceBus {
        &self.bus
    }

    /// Issues a ticket for a new profile request, superseding earlier ones
    /// for the same character.
    pub fn request_profile(&self, character: impl Into<CharacterName>) -> ProfileTicket {
        let character = character.into();
        let mut inputs = self.inputs.lock();
        inputs.next_generation += 1;
        let generation = inputs.next_generation;
        inputs.tickets.insert(character.clone(), generation);
        ProfileTicket {
            character,
            generation,
        }
    }

    /// Drains the bus, applies every event and recomputes if anything changed.
    pub fn pump(&self) -> PumpReport {
        let events = self.bus.drain();
        self.apply_all(events)
    }

    /// Applies events directly, bypassing the bus.
    pub fn apply_all(&self, events: impl IntoIterator<Item = SourceEvent>) -> PumpReport {
        let mut report = PumpReport::default();
        let mut inputs = self.inputs.lock();
        for event in events {
            if inputs.apply(event) {
                report.applied += 1;
            } else {
                report.dropped += 1;
            }
        }

        if report.applied > 0 {
            let next = Arc::new(inputs.derive());
            *self.derived.write() = next;
            report.recomputed = true;
        }
        report
    }

    /// Latest derived snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Derived> {
        Arc::clone(&self.derived.read())
    }

    /// Account roster, once it has arrived.
    #[must_use]
    pub fn roster(&self) -> Option<Vec<CharacterName>> {
        self.inputs.lock().roster.clone()
    }

    /// Characters grouped by profession.
    ///
    /// Groups appear in order of their first member in the roster (or in
    /// profile arrival order while the roster is unknown). Characters
    /// without details form a trailing group with no profession.
    #[must_use]
    pub fn character_groups(&self) -> Vec<CharacterGroup> {
        let inputs = self.inputs.lock();
        let names: Vec<CharacterName> = match &inputs.roster {
            Some(roster) => roster.clone(),
            None => inputs.profiles.iter().map(|(n, _)| n.clone()).collect(),
        };

        let mut groups: Vec<CharacterGroup> = Vec::new();
        let mut unresolved = Vec::new();
        for name in names {
            let Some(detail) = inputs.details.get(&name) else {
                unresolved.push(name);
                continue;
            };
            match groups
                .iter_mut()
                .find(|g| g.profession.as_deref() == Some(detail.profession.as_str()))
            {
                Some(group) => group.characters.push(name),
                None => groups.push(CharacterGroup {
                    profession: Some(detail.profession.clone()),
                    characters: vec![name],
                }),
            }
        }
        if !unresolved.is_empty() {
            groups.push(CharacterGroup {
                profession: None,
                characters: unresolved,
            });
        }
        groups
    }
}
