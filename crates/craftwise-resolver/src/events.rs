//! Source events and the bus that carries them into a session.
//!
//! Every external collaborator (catalog loader, account source, profile and
//! detail sources) publishes its results here. Sources resolve in any order;
//! the session drains the bus and applies what it finds.

use craftwise_common::CharacterName;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::capability::{CharacterCraftingProfile, CharacterDetail};
use crate::inventory::{InventoryStack, StorageKey};
use crate::model::{Item, Recipe};

/// Default bus capacity.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Identifies one profile request for a character.
///
/// Only the most recently issued ticket for a character is applicable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileTicket {
    /// Character the request is for.
    pub character: CharacterName,
    /// Request generation; higher is newer.
    pub generation: u64,
}

/// A result delivered by one external source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SourceEvent {
    /// Bulk catalog loaded
    CatalogLoaded {
        /// Item metadata
        items: Vec<Item>,
        /// Recipe definitions
        recipes: Vec<Recipe>,
    },
    /// Slots of one storage location arrived
    StorageArrived {
        /// Storage snapshot the slots replace
        key: StorageKey,
        /// Slots, `None` for empty
        slots: Vec<Option<InventoryStack>>,
    },
    /// Account character names arrived
    RosterArrived {
        /// Names in account order
        characters: Vec<CharacterName>,
    },
    /// One character's crafting profile arrived
    ProfileArrived {
        /// Ticket the request was issued with
        ticket: ProfileTicket,
        /// Discipline ratings
        profiles: Vec<CharacterCraftingProfile>,
    },
    /// One character's details arrived
    DetailArrived {
        /// Details
        detail: CharacterDetail,
    },
}

impl SourceEvent {
    /// Short name of the event kind, for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CatalogLoaded { .. } => "catalog",
            Self::StorageArrived { .. } => "storage",
            Self::RosterArrived { .. } => "roster",
            Self::ProfileArrived { .. } => "profile",
            Self::DetailArrived { .. } => "detail",
        }
    }
}

/// Bounded channel carrying [`SourceEvent`]s to a session.
#[derive(Debug, Clone)]
pub struct SourceBus {
    sender: Sender<SourceEvent>,
    receiver: Receiver<SourceEvent>,
    capacity: usize,
}

impl Default for SourceBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl SourceBus {
    /// Creates a new bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an event without blocking. Returns false if it was dropped.
    pub fn publish(&self, event: SourceEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!("Source bus full, dropping {} event", event.kind());
                false
            },
            Err(TrySendError::Disconnected(event)) => {
                warn!("Source bus closed, dropping {} event", event.kind());
                false
            },
        }
    }

    /// Drains all pending events in arrival order.
    pub fn drain(&self) -> Vec<SourceEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a sender handle for a collaborator running elsewhere.
    #[must_use]
    pub fn sender(&self) -> Sender<SourceEvent> {
        self.sender.clone()
    }
}
