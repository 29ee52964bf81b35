//! `TownCache`: local mirror of the authoritative town snapshot.
//!
//! The cache never patches state in place. Every accepted snapshot replaces
//! the previous one wholesale and the occupancy index is rebuilt from it, so
//! the index always matches exactly the snapshot it was derived from.

use std::collections::HashMap;

use crate::protocol::{Npc, TownEvent, TownSnapshot};
use crate::types::GridPos;

// ---------------------------------------------------------------------------
// Occupancy index
// ---------------------------------------------------------------------------

/// Position lookups derived from a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccupancyIndex {
    /// One NPC per cell. Later entries in the snapshot win.
    pub npcs: HashMap<GridPos, Npc>,
    /// Events whose state is `available`. Later entries win.
    pub events: HashMap<GridPos, TownEvent>,
}

impl OccupancyIndex {
    /// Build both lookups from scratch. O(npcs + events).
    pub fn build(snapshot: &TownSnapshot) -> Self {
        let npcs = snapshot
            .npcs
            .iter()
            .map(|npc| (npc.pos, npc.clone()))
            .collect();
        let events = snapshot
            .events
            .iter()
            .filter(|event| event.is_available())
            .map(|event| (event.pos, event.clone()))
            .collect();
        Self { npcs, events }
    }

    pub fn npc_at(&self, pos: GridPos) -> Option<&Npc> {
        self.npcs.get(&pos)
    }

    pub fn event_at(&self, pos: GridPos) -> Option<&TownEvent> {
        self.events.get(&pos)
    }

    pub fn is_blocked(&self, pos: GridPos) -> bool {
        self.npcs.contains_key(&pos)
    }

    pub fn npc_count(&self) -> usize {
        self.npcs.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// The current snapshot together with the index derived from it.
///
/// The two fields are private so they can only change together.
#[derive(Debug, Clone)]
pub struct TownCache {
    snapshot: TownSnapshot,
    index: OccupancyIndex,
}

impl TownCache {
    pub fn new(snapshot: TownSnapshot) -> Self {
        let index = OccupancyIndex::build(&snapshot);
        Self { snapshot, index }
    }

    pub fn snapshot(&self) -> &TownSnapshot {
        &self.snapshot
    }

    pub fn index(&self) -> &OccupancyIndex {
        &self.index
    }

    pub fn version(&self) -> u64 {
        self.snapshot.version
    }

    /// Adopt `snapshot` as the new authoritative state.
    ///
    /// The server is the only authority on `version`, so a lower version is
    /// adopted as-is and merely logged.
    pub fn replace(&mut self, snapshot: TownSnapshot) {
        let previous = self.snapshot.version;
        if snapshot.version < previous {
            log::warn!(
                "Town version moved backwards ({} -> {}), adopting server value",
                previous,
                snapshot.version
            );
        } else {
            log::debug!("Replacing snapshot v{} -> v{}", previous, snapshot.version);
        }
        *self = Self::new(snapshot);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
