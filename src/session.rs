//! `TownSession`: local player state and the interaction state machine.
//!
//! ## Interaction lifecycle
//!
//! ```text
//!          begin_interaction()                 finish_interaction()
//!  Idle ───────────────────────▶ Pending ───────────────────────────▶ Idle
//!    │  no event at target                │  every reply, error included
//!    └──▶ Idle (nothing sent)             │
//!                                         └─ begin_interaction() → Busy
//! ```
//!
//! The session is only constructed from a loaded snapshot, so there is no
//! "not loaded yet" state to guard against here. Network I/O happens outside:
//! `begin_interaction` hands back the request to send and `finish_interaction`
//! consumes whatever came back.

use std::collections::VecDeque;

use crate::cache::{OccupancyIndex, TownCache};
use crate::content::{keys, Content};
use crate::error::ClientError;
use crate::events::{ClientEvent, InteractionOutcome};
use crate::movement::{cell_blocked, check_move, compute_target, first_open_cell};
use crate::protocol::{EventPayload, EventReply, EventRequest, EventSuccess, TownSnapshot};
use crate::types::{Direction, GridPos};

// ---------------------------------------------------------------------------
// Interaction state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    /// A request is outstanding. Blocks new interactions and movement.
    Pending { event_id: String, target: GridPos },
}

impl InteractionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, InteractionState::Pending { .. })
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Most events kept between two `poll()` calls. Older ones are dropped.
pub const EVENT_QUEUE_LIMIT: usize = 256;

pub struct TownSession {
    content: Content,
    cache: TownCache,
    position: GridPos,
    facing: Direction,
    interaction: InteractionState,
    status: String,
    dialog: String,
    events: VecDeque<ClientEvent>,
}

impl TownSession {
    /// Start a session on a freshly loaded snapshot.
    ///
    /// A `start` outside the grid, on impassable terrain or on an NPC is
    /// replaced by the first open cell of the town.
    pub fn new(content: Content, snapshot: TownSnapshot, start: GridPos, facing: Direction) -> Self {
        let status = content.ui.get(keys::TOWN_LOADED).to_string();
        let cache = TownCache::new(snapshot);
        let position = settle_start(start, &cache);
        log::info!(
            "Session started in {} v{} at {} facing {}",
            cache.snapshot().town_id,
            cache.version(),
            position,
            facing
        );
        Self {
            content,
            cache,
            position,
            facing,
            interaction: InteractionState::Idle,
            status,
            dialog: String::new(),
            events: VecDeque::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn snapshot(&self) -> &TownSnapshot {
        self.cache.snapshot()
    }

    pub fn index(&self) -> &OccupancyIndex {
        self.cache.index()
    }

    pub fn version(&self) -> u64 {
        self.cache.version()
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn dialog(&self) -> &str {
        &self.dialog
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn is_pending(&self) -> bool {
        self.interaction.is_pending()
    }

    /// Cell the next interaction would address.
    pub fn target(&self) -> GridPos {
        compute_target(self.position, self.facing)
    }

    /// Drain queued events without blocking. Callers that never poll only
    /// keep the newest [`EVENT_QUEUE_LIMIT`] events.
    pub fn poll(&mut self) -> Vec<ClientEvent> {
        self.events.drain(..).collect()
    }

    // ------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------

    /// Try to move one cell. Facing follows the attempted direction even when
    /// the move is refused. While an interaction is pending the call is a
    /// no-op and facing is left alone.
    ///
    /// Returns whether the position changed.
    pub fn step(&mut self, direction: Direction) -> bool {
        if self.is_pending() {
            log::debug!("Ignoring move {} while interaction is pending", direction);
            return false;
        }

        self.facing = direction;
        let moved = match check_move(self.position, direction, self.cache.snapshot(), self.cache.index()) {
            Ok(next) => {
                self.position = next;
                true
            }
            Err(reason) => {
                log::trace!("Move {} from {} blocked: {}", direction, self.position, reason);
                false
            }
        };

        self.emit(ClientEvent::Moved {
            position: self.position,
            facing: self.facing,
            moved,
        });
        moved
    }

    // ------------------------------------------------------------------
    // Interaction
    // ------------------------------------------------------------------

    /// `Idle → Pending`.
    ///
    /// Returns the request to send, or the outcome when nothing should be
    /// sent: `Busy` if a request is already outstanding, `NoTarget` if there
    /// is no available event in the faced cell.
    pub fn begin_interaction(&mut self) -> Result<EventRequest, InteractionOutcome> {
        if self.is_pending() {
            log::debug!("Interaction already pending, ignoring");
            return Err(InteractionOutcome::Busy);
        }

        let target = self.target();
        let Some(event) = self.cache.index().event_at(target) else {
            let outcome = InteractionOutcome::NoTarget { target };
            self.set_status(self.content.ui.get(keys::STATUS_NO_TARGET).to_string());
            self.emit(ClientEvent::InteractionFinished(outcome.clone()));
            return Err(outcome);
        };

        let request = EventRequest {
            event_id: event.event_id.clone(),
            version: self.cache.version(),
            payload: EventPayload {
                player_position: self.position,
                target_position: target,
            },
        };

        log::info!(
            "Interacting with '{}' at {} (v{})",
            request.event_id,
            target,
            request.version
        );
        self.interaction = InteractionState::Pending {
            event_id: request.event_id.clone(),
            target,
        };
        self.set_status(self.content.ui.get(keys::STATUS_INTERACTING).to_string());
        self.emit(ClientEvent::InteractionStarted {
            event_id: request.event_id.clone(),
            version: request.version,
        });
        Ok(request)
    }

    /// `Pending → Idle`. Reconciles local state with the reply and always
    /// releases the pending guard.
    pub fn finish_interaction(
        &mut self,
        reply: Result<EventReply, ClientError>,
    ) -> InteractionOutcome {
        if !self.is_pending() {
            log::warn!("Reply received with no interaction pending");
        }

        let outcome = self.reconcile(reply);

        self.interaction = InteractionState::Idle;
        self.emit(ClientEvent::InteractionFinished(outcome.clone()));
        outcome
    }

    fn reconcile(&mut self, reply: Result<EventReply, ClientError>) -> InteractionOutcome {
        match reply {
            Ok(EventReply::Accepted(success)) => self.apply_success(success),

            Ok(EventReply::Conflict { snapshot }) => {
                log::info!(
                    "Stale client (sent v{}), resyncing to v{}",
                    self.cache.version(),
                    snapshot.version
                );
                let version = snapshot.version;
                self.adopt(snapshot);
                self.set_status(self.content.ui.get(keys::EVENT_STALE).to_string());
                InteractionOutcome::Resynced { version }
            }

            Ok(EventReply::Rejected { status, code }) => {
                log::info!("Interaction rejected ({}): {}", status, code);
                self.set_status(self.content.ui.rejection_status(&code));
                InteractionOutcome::Rejected { code }
            }

            Err(err) => {
                log::warn!("Interaction failed: {}", err);
                let reason = err.to_string();
                self.set_status(self.content.ui.prefixed_error(&reason));
                InteractionOutcome::TransportFailed { reason }
            }
        }
    }

    fn apply_success(&mut self, success: EventSuccess) -> InteractionOutcome {
        if success.idempotent {
            log::debug!("Event '{}' replayed by server", success.event_id);
        }

        if let Some(snapshot) = success.snapshot {
            self.adopt(snapshot);
        }

        let key = success
            .event_result
            .as_ref()
            .and_then(|result| result.message_key.as_deref());
        let text = self.content.dialog.message(key);
        self.dialog = text.clone();
        self.emit(ClientEvent::DialogChanged(text.clone()));
        self.set_status(text);

        InteractionOutcome::Applied {
            event_id: success.event_id,
            idempotent: success.idempotent,
            version: self.cache.version(),
        }
    }

    fn adopt(&mut self, snapshot: TownSnapshot) {
        let previous_version = self.cache.version();
        self.cache.replace(snapshot);
        self.emit(ClientEvent::SnapshotReplaced {
            previous_version,
            version: self.cache.version(),
        });
    }

    fn set_status(&mut self, status: String) {
        self.status = status.clone();
        self.emit(ClientEvent::StatusChanged(status));
    }

    fn emit(&mut self, event: ClientEvent) {
        if self.events.len() == EVENT_QUEUE_LIMIT {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

fn settle_start(start: GridPos, cache: &TownCache) -> GridPos {
    let Some(reason) = cell_blocked(start, cache.snapshot(), cache.index()) else {
        return start;
    };
    match first_open_cell(cache.snapshot(), cache.index()) {
        Some(open) => {
            log::warn!("Start {} is unusable ({}), placing player at {}", start, reason, open);
            open
        }
        None => {
            log::warn!("Start {} is unusable ({}) and the town has no open cell", start, reason);
            start
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
