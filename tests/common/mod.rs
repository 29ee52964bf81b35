//! Shared fixtures: the 8x6 gate town and its content tables.

#![allow(dead_code)]

use serde_json::json;
use town_client::{Content, DialogPack, TownSnapshot, UiStrings};

pub fn ui() -> UiStrings {
    serde_json::from_value(json!({
        "title": "B Game: Town of Threads",
        "loading": "Loading town...",
        "errorPrefix": "Error:",
        "townLoaded": "Town ready.",
        "statusNoTarget": "No nearby interaction target.",
        "statusInteracting": "Interacting...",
        "eventDenied": "That action is not allowed right now.",
        "eventStale": "Your town version was stale. Snapshot refreshed.",
        "eventBadPosition": "Move next to the target and try again.",
        "eventUnknown": "Unknown interaction.",
        "eventNoSession": "Session missing. Reload the page.",
        "facingEast": "East",
        "codexFootnoteThresholdVersion": 14,
        "codexFootnote": "Deep in the town archives."
    }))
    .unwrap()
}

pub fn dialog() -> DialogPack {
    serde_json::from_value(json!({
        "npcNames": {},
        "messages": {"event.sign_gate": "Gate District message."},
        "itemNames": {},
        "itemDescriptions": {},
        "flagLabels": {}
    }))
    .unwrap()
}

pub fn content() -> Content {
    Content {
        ui: ui(),
        dialog: dialog(),
    }
}

pub fn snapshot_json(version: u64) -> serde_json::Value {
    json!({
        "town_id": "town-000001",
        "seed": 123,
        "width": 8,
        "height": 6,
        "tiles": [
            "WWWWWWWW",
            "WGGGGGGW",
            "WGGPGGGW",
            "WGGGGGGW",
            "WGGGGGGW",
            "WWWWWWWW"
        ],
        "npcs": [
            {"npc_id": "npc_lyra", "name_key": "npc.npc_lyra", "pos": {"x": 5, "y": 2}, "event_ids": ["talk_npc_lyra"]}
        ],
        "events": [
            {"event_id": "read_sign_gate", "type": "read_sign", "state": "available", "pos": {"x": 4, "y": 2}}
        ],
        "allowed_event_ids": ["read_sign_gate"],
        "version": version,
        "player_state": {"flags": [], "items": []}
    })
}

pub fn snapshot(version: u64) -> TownSnapshot {
    serde_json::from_value(snapshot_json(version)).unwrap()
}

/// Open 8x6 meadow with no walls, NPCs or events.
pub fn meadow() -> TownSnapshot {
    let mut s = snapshot(1);
    s.tiles = vec!["GGGGGGGG".into(); 6];
    s.npcs.clear();
    s.events.clear();
    s
}
