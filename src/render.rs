//! Plain-text presentation of a [`TownSession`].
//!
//! Produces no state of its own; everything is read from the session.

use std::fmt::Write as _;

use crate::content::keys;
use crate::session::TownSession;
use crate::terrain::{TileSource, Terrain};
use crate::types::GridPos;

pub const GLYPH_PLAYER: char = '@';
pub const GLYPH_NPC: char = 'N';
pub const GLYPH_EVENT: char = '*';

/// Background glyph for a tile. Unknown tiles draw as grass.
pub fn tile_glyph(terrain: Option<Terrain>) -> char {
    match terrain {
        Some(Terrain::Wall) => '#',
        Some(Terrain::Path) => '=',
        Some(Terrain::Bridge) => '+',
        Some(Terrain::Grass) | Some(Terrain::Unknown) | None => '.',
    }
}

/// The map grid, one line per row. Player beats NPC beats event.
pub fn render_map(session: &TownSession) -> String {
    let snapshot = session.snapshot();
    let index = session.index();
    let player = session.position();

    let mut out = String::with_capacity(((snapshot.width + 1) * snapshot.height) as usize);
    for y in 0..snapshot.height as i32 {
        for x in 0..snapshot.width as i32 {
            let pos = GridPos::new(x, y);
            let glyph = if pos == player {
                GLYPH_PLAYER
            } else if index.npc_at(pos).is_some() {
                GLYPH_NPC
            } else if index.event_at(pos).is_some() {
                GLYPH_EVENT
            } else {
                tile_glyph(snapshot.terrain_at(pos))
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

/// Status, inventory and flags, resolved through the loaded content.
pub fn render_panel(session: &TownSession) -> String {
    let ui = &session.content().ui;
    let dialog = &session.content().dialog;
    let snapshot = session.snapshot();
    let pos = session.position();

    let mut out = String::new();
    let _ = writeln!(out, "-- {} --", ui.get("statusTitle"));
    let _ = writeln!(out, "{}: {},{}", ui.get("statusCoords"), pos.x, pos.y);
    let _ = writeln!(
        out,
        "{}: {}",
        ui.get("statusFacing"),
        ui.facing_label(session.facing())
    );
    let _ = writeln!(out, "{}: {}", ui.get("statusVersion"), snapshot.version);
    let _ = writeln!(out, "{}: {}", ui.get("statusTownId"), snapshot.town_id);

    let _ = writeln!(out, "-- {} --", ui.get("dialogTitle"));
    let _ = writeln!(out, "{}", session.dialog());

    let _ = writeln!(out, "-- {} --", ui.get("inventoryTitle"));
    let items = &snapshot.player_state.items;
    if items.is_empty() {
        let _ = writeln!(out, "{}", ui.get("emptyInventory"));
    }
    for item in items {
        let _ = writeln!(
            out,
            "{} x{}\n  {}",
            dialog.item_name(&item.name_key),
            item.qty,
            dialog.item_description(&item.description_key)
        );
    }

    let _ = writeln!(out, "-- {} --", ui.get("flagsTitle"));
    let flags = &snapshot.player_state.flags;
    if flags.is_empty() {
        let _ = writeln!(out, "{}", ui.get("emptyFlags"));
    }
    for flag in flags {
        let _ = writeln!(out, "{}", dialog.flag_label(flag));
    }

    if ui.footnote_visible(snapshot.version) {
        let _ = writeln!(out, "{}", ui.get(keys::CODEX_FOOTNOTE));
    }
    out
}

/// Full screen: title, map, status line, legend, side panel.
pub fn render(session: &TownSession) -> String {
    let ui = &session.content().ui;
    let mut out = String::new();
    let _ = writeln!(out, "{}", ui.get(keys::TITLE));
    out.push_str(&render_map(session));
    let _ = writeln!(out, "{}", session.status());
    let _ = writeln!(
        out,
        "{GLYPH_PLAYER} {}   {GLYPH_NPC} {}   {GLYPH_EVENT} {}",
        ui.get("legendPlayer"),
        ui.get("legendNpc"),
        ui.get("legendEvent")
    );
    out.push_str(&render_panel(session));
    out
}
