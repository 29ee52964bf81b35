//! Session events delivered to the presentation layer.
//!
//! [`crate::session::TownSession`] queues these as state changes and the
//! front end drains them with `poll()` once per frame.

use crate::protocol::ErrorCode;
use crate::types::{Direction, GridPos};

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Player position or facing changed (or a move was refused).
    Moved {
        position: GridPos,
        facing: Direction,
        moved: bool,
    },

    /// A new snapshot was adopted and the indices rebuilt.
    SnapshotReplaced { previous_version: u64, version: u64 },

    StatusChanged(String),
    DialogChanged(String),

    // ------------------------------------------------------------------
    // Interaction lifecycle
    // ------------------------------------------------------------------
    InteractionStarted { event_id: String, version: u64 },
    InteractionFinished(InteractionOutcome),
}

/// How an interaction attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    /// Another request was already in flight; nothing was sent.
    Busy,
    /// No available event at the target cell; nothing was sent.
    NoTarget { target: GridPos },
    /// Server applied (or replayed) the event.
    Applied {
        event_id: String,
        idempotent: bool,
        version: u64,
    },
    /// Server reported a stale version; its snapshot was adopted.
    Resynced { version: u64 },
    /// Server declined for a domain reason.
    Rejected { code: ErrorCode },
    /// No structured reply was obtained.
    TransportFailed { reason: String },
}

impl InteractionOutcome {
    /// True when a request actually reached the transport.
    pub fn was_sent(&self) -> bool {
        !matches!(
            self,
            InteractionOutcome::Busy | InteractionOutcome::NoTarget { .. }
        )
    }
}
