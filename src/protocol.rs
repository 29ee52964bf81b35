//! Town service wire protocol.
//!
//! This module owns **every document that crosses the HTTP boundary** between
//! the client and the town service.
//!
//! ## Endpoints
//!
//! | Route                         | Method | Body (request → response)                  |
//! |-------------------------------|--------|--------------------------------------------|
//! | `<api>/town/`                 | GET    | → [`TownSnapshot`]                         |
//! | `<api>/town/event/`           | POST   | [`EventRequest`] → [`EventSuccess`] / [`EventFailure`] |
//! | `<content>/ui.json`           | GET    | → UI string table                          |
//! | `<content>/dialog/<pack>.json`| GET    | → dialog pack                              |
//!
//! ## Design rules
//!
//! 1. Every struct is `Serialize + Deserialize` with snake_case JSON.
//! 2. Snapshots are always sent whole; there are no incremental patches.
//! 3. `version` is the concurrency token. The client echoes the version it
//!    last adopted and the server answers `stale_client` when it is behind.
//! 4. Rejections are data ([`EventReply`]), never Rust errors.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::types::GridPos;

// ---------------------------------------------------------------------------
// Snapshot  (GET town/)
// ---------------------------------------------------------------------------

/// Complete, versioned copy of the authoritative town state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownSnapshot {
    pub town_id: String,
    /// Generation seed. Informational only on the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub width: u32,
    pub height: u32,
    /// `height` rows of `width` tile characters each.
    pub tiles: Vec<String>,
    #[serde(default)]
    pub npcs: Vec<Npc>,
    #[serde(default)]
    pub events: Vec<TownEvent>,
    #[serde(default)]
    pub allowed_event_ids: Vec<String>,
    pub version: u64,
    #[serde(default)]
    pub player_state: PlayerState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub npc_id: String,
    /// Dialog-pack key for the display name.
    pub name_key: String,
    pub pos: GridPos,
    #[serde(default)]
    pub event_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownEvent {
    pub event_id: String,
    /// Server-defined type tag (`read_sign`, `open_chest`, `talk_npc`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub state: EventState,
    pub pos: GridPos,
}

impl TownEvent {
    pub fn is_available(&self) -> bool {
        self.state == EventState::Available
    }
}

/// Lifecycle state of an event. Only `available` events are interactable;
/// every other value (`consumed`, ...) is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventState {
    Available,
    Other(String),
}

impl From<String> for EventState {
    fn from(value: String) -> Self {
        if value == "available" {
            EventState::Available
        } else {
            EventState::Other(value)
        }
    }
}

impl From<EventState> for String {
    fn from(value: EventState) -> Self {
        match value {
            EventState::Available => "available".to_string(),
            EventState::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub items: Vec<InventoryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_id: String,
    pub name_key: String,
    pub description_key: String,
    pub qty: u32,
}

// ---------------------------------------------------------------------------
// Event request  (POST town/event/)
// ---------------------------------------------------------------------------

/// Body of an interaction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    pub event_id: String,
    /// Version of the snapshot the client last adopted.
    pub version: u64,
    pub payload: EventPayload,
}

/// Positions the server uses to re-check adjacency independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub player_position: GridPos,
    pub target_position: GridPos,
}

// ---------------------------------------------------------------------------
// Event responses
// ---------------------------------------------------------------------------

/// 2xx body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSuccess {
    #[serde(default)]
    pub event_id: String,
    /// True when the server replayed a previously recorded result.
    #[serde(default)]
    pub idempotent: bool,
    #[serde(default)]
    pub event_result: Option<EventResult>,
    #[serde(default)]
    pub snapshot: Option<TownSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventResult {
    #[serde(default)]
    pub message_key: Option<String>,
    #[serde(default)]
    pub flags_added: Vec<String>,
    #[serde(default)]
    pub items_added: Vec<String>,
}

/// Non-2xx body.
///
/// The snapshot is kept as raw JSON so a malformed one cannot take the error
/// code down with it; it is only decoded for `stale_client`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFailure {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub snapshot: Option<serde_json::Value>,
}

/// Error codes the town service is known to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    StaleClient,
    InvalidPosition,
    EventNotAllowed,
    UnknownEvent,
    NoSession,
    /// Anything else, including a missing code (empty string).
    Other(String),
}

impl ErrorCode {
    pub fn from_wire(code: Option<&str>) -> Self {
        match code.unwrap_or_default() {
            "stale_client" => ErrorCode::StaleClient,
            "invalid_position" => ErrorCode::InvalidPosition,
            "event_not_allowed" => ErrorCode::EventNotAllowed,
            "unknown_event" => ErrorCode::UnknownEvent,
            "no_session" => ErrorCode::NoSession,
            other => ErrorCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::StaleClient => "stale_client",
            ErrorCode::InvalidPosition => "invalid_position",
            ErrorCode::EventNotAllowed => "event_not_allowed",
            ErrorCode::UnknownEvent => "unknown_event",
            ErrorCode::NoSession => "no_session",
            ErrorCode::Other(s) => s,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw HTTP answer to an event POST, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A structured answer to an event POST.
#[derive(Debug, Clone, PartialEq)]
pub enum EventReply {
    /// The event was applied (or replayed).
    Accepted(EventSuccess),
    /// The submitted version was behind; carries the server's current state.
    Conflict { snapshot: TownSnapshot },
    /// The server declined for any other reason. A snapshot attached to a
    /// domain rejection is deliberately dropped.
    Rejected { status: u16, code: ErrorCode },
}

impl EventReply {
    /// Classify a raw reply.
    ///
    /// A 2xx body that is not a success document is a decode error. A non-2xx
    /// body that is not JSON is a rejection with an empty code.
    pub fn classify(raw: &RawReply) -> Result<EventReply, ClientError> {
        if raw.is_success() {
            let success: EventSuccess =
                serde_json::from_slice(&raw.body).map_err(|source| ClientError::Decode {
                    context: "event response",
                    source,
                })?;
            return Ok(EventReply::Accepted(success));
        }

        let failure: EventFailure = serde_json::from_slice(&raw.body).unwrap_or_default();
        let code = ErrorCode::from_wire(failure.error_code.as_deref());

        if code == ErrorCode::StaleClient {
            match failure.snapshot.map(serde_json::from_value::<TownSnapshot>) {
                Some(Ok(snapshot)) => return Ok(EventReply::Conflict { snapshot }),
                Some(Err(err)) => log::warn!("Discarding malformed stale_client snapshot: {}", err),
                None => {}
            }
        }

        Ok(EventReply::Rejected {
            status: raw.status,
            code,
        })
    }
}

// ---------------------------------------------------------------------------
// Route helpers
// ---------------------------------------------------------------------------

/// Paths used by the town protocol, relative to the API / content bases.
pub mod routes {
    pub const TOWN: &str = "town/";
    pub const TOWN_EVENT: &str = "town/event/";

    pub const UI_STRINGS: &str = "ui.json";
    pub const DIALOG_DIR: &str = "dialog";

    /// Header carrying the CSRF token on unsafe requests.
    pub const CSRF_HEADER: &str = "X-CSRFToken";

    pub fn dialog_pack(pack: &str) -> String {
        format!("{DIALOG_DIR}/{pack}.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot_json(version: u64) -> serde_json::Value {
        json!({
            "town_id": "town-000001",
            "seed": 123,
            "width": 3,
            "height": 1,
            "tiles": ["GGG"],
            "npcs": [],
            "events": [
                {"event_id": "read_sign_gate", "type": "read_sign", "state": "available", "pos": {"x": 1, "y": 0}},
                {"event_id": "open_chest_herb", "type": "open_chest", "state": "consumed", "pos": {"x": 2, "y": 0}}
            ],
            "allowed_event_ids": ["read_sign_gate"],
            "version": version,
            "player_state": {"flags": [], "items": []}
        })
    }

    #[test]
    fn snapshot_parses_event_states() {
        let snap: TownSnapshot = serde_json::from_value(snapshot_json(1)).unwrap();
        assert!(snap.events[0].is_available());
        assert_eq!(snap.events[1].state, EventState::Other("consumed".into()));
        assert_eq!(snap.events[0].kind, "read_sign");
        assert_eq!(snap.seed, Some(123));
    }

    #[test]
    fn snapshot_tolerates_missing_optional_sections() {
        let snap: TownSnapshot = serde_json::from_value(json!({
            "town_id": "t", "width": 1, "height": 1, "tiles": ["G"], "version": 7
        }))
        .unwrap();
        assert!(snap.npcs.is_empty());
        assert!(snap.player_state.items.is_empty());
        assert_eq!(snap.version, 7);
    }

    #[test]
    fn request_serializes_to_wire_shape() {
        let req = EventRequest {
            event_id: "read_sign_gate".into(),
            version: 3,
            payload: EventPayload {
                player_position: GridPos::new(3, 2),
                target_position: GridPos::new(4, 2),
            },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            json!({
                "event_id": "read_sign_gate",
                "version": 3,
                "payload": {
                    "player_position": {"x": 3, "y": 2},
                    "target_position": {"x": 4, "y": 2}
                }
            })
        );
    }

    #[test]
    fn classify_success() {
        let body = json!({
            "event_id": "read_sign_gate",
            "idempotent": false,
            "event_result": {"message_key": "event.sign_gate", "flags_added": [], "items_added": []},
            "snapshot": snapshot_json(2)
        });
        let reply = EventReply::classify(&RawReply::new(200, body.to_string())).unwrap();
        match reply {
            EventReply::Accepted(s) => {
                assert_eq!(s.snapshot.unwrap().version, 2);
                assert_eq!(
                    s.event_result.unwrap().message_key.as_deref(),
                    Some("event.sign_gate")
                );
            }
            other => panic!("expected Accepted, got {other:?}"),
        }
    }

    #[test]
    fn classify_stale_with_snapshot_is_conflict() {
        let body = json!({"error_code": "stale_client", "snapshot": snapshot_json(5)});
        let reply = EventReply::classify(&RawReply::new(409, body.to_string())).unwrap();
        match reply {
            EventReply::Conflict { snapshot } => assert_eq!(snapshot.version, 5),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn classify_stale_without_snapshot_is_rejection() {
        let body = json!({"error_code": "stale_client"});
        let reply = EventReply::classify(&RawReply::new(409, body.to_string())).unwrap();
        assert_eq!(
            reply,
            EventReply::Rejected {
                status: 409,
                code: ErrorCode::StaleClient
            }
        );
    }

    #[test]
    fn classify_domain_rejection_drops_snapshot() {
        let body = json!({"error_code": "invalid_position", "snapshot": snapshot_json(9)});
        let reply = EventReply::classify(&RawReply::new(400, body.to_string())).unwrap();
        assert_eq!(
            reply,
            EventReply::Rejected {
                status: 400,
                code: ErrorCode::InvalidPosition
            }
        );
    }

    #[test]
    fn malformed_snapshot_keeps_error_code() {
        let body = json!({"error_code": "invalid_position", "snapshot": {"town_id": "t"}});
        let reply = EventReply::classify(&RawReply::new(400, body.to_string())).unwrap();
        assert_eq!(
            reply,
            EventReply::Rejected {
                status: 400,
                code: ErrorCode::InvalidPosition
            }
        );

        let body = json!({"error_code": "stale_client", "snapshot": {"town_id": "t"}});
        let reply = EventReply::classify(&RawReply::new(409, body.to_string())).unwrap();
        assert_eq!(
            reply,
            EventReply::Rejected {
                status: 409,
                code: ErrorCode::StaleClient
            }
        );
    }

    #[test]
    fn classify_non_json_error_body() {
        let reply = EventReply::classify(&RawReply::new(502, "<html>bad gateway</html>")).unwrap();
        assert_eq!(
            reply,
            EventReply::Rejected {
                status: 502,
                code: ErrorCode::Other(String::new())
            }
        );
    }

    #[test]
    fn classify_garbled_success_is_decode_error() {
        let err = EventReply::classify(&RawReply::new(200, "not json")).unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[test]
    fn error_codes_round_trip_through_wire_names() {
        for code in [
            "stale_client",
            "invalid_position",
            "event_not_allowed",
            "unknown_event",
            "no_session",
            "bad_version",
        ] {
            assert_eq!(ErrorCode::from_wire(Some(code)).as_str(), code);
        }
        assert_eq!(ErrorCode::from_wire(None), ErrorCode::Other(String::new()));
    }
}
