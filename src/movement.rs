//! Movement and target resolution.
//!
//! Both resolvers are pure: they read the tile grid and the occupancy index
//! and never touch session state. Facing bookkeeping lives in
//! [`crate::session::TownSession::step`].

use crate::cache::OccupancyIndex;
use crate::terrain::TileSource;
use crate::types::{Direction, GridPos};

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveBlocked {
    OutOfBounds,
    Impassable(char),
    Occupied,
}

impl std::fmt::Display for MoveBlocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveBlocked::OutOfBounds => f.write_str("out of bounds"),
            MoveBlocked::Impassable(tile) => write!(f, "impassable tile '{tile}'"),
            MoveBlocked::Occupied => f.write_str("occupied by an npc"),
        }
    }
}

/// The first rule that keeps the player off `cell`, if any. Bounds are
/// checked before terrain, terrain before occupancy.
pub fn cell_blocked(
    cell: GridPos,
    tiles: &impl TileSource,
    index: &OccupancyIndex,
) -> Option<MoveBlocked> {
    if !tiles.contains(cell) {
        return Some(MoveBlocked::OutOfBounds);
    }

    // A row shorter than the declared width reads as a wall.
    let tile = tiles.tile_at(cell).unwrap_or('W');
    if !crate::terrain::is_passable(tile) {
        return Some(MoveBlocked::Impassable(tile));
    }

    if index.is_blocked(cell) {
        return Some(MoveBlocked::Occupied);
    }

    None
}

/// Check a single step and return the destination, or the first rule it
/// breaks.
pub fn check_move(
    current: GridPos,
    direction: Direction,
    tiles: &impl TileSource,
    index: &OccupancyIndex,
) -> Result<GridPos, MoveBlocked> {
    let candidate = current.step(direction);
    match cell_blocked(candidate, tiles, index) {
        Some(reason) => Err(reason),
        None => Ok(candidate),
    }
}

/// First cell the player may stand on, scanning rows top to bottom.
pub fn first_open_cell(tiles: &impl TileSource, index: &OccupancyIndex) -> Option<GridPos> {
    (0..tiles.height() as i32)
        .flat_map(|y| (0..tiles.width() as i32).map(move |x| GridPos::new(x, y)))
        .find(|&cell| cell_blocked(cell, tiles, index).is_none())
}

/// Resolve a directional move: the neighbouring cell when legal, otherwise
/// `current` unchanged.
pub fn attempt_move(
    current: GridPos,
    direction: Direction,
    tiles: &impl TileSource,
    index: &OccupancyIndex,
) -> GridPos {
    check_move(current, direction, tiles, index).unwrap_or(current)
}

/// The cell an interaction addresses. Ignores terrain and occupancy, so a
/// sign on a wall or an NPC's own cell are valid targets.
pub fn compute_target(position: GridPos, facing: Direction) -> GridPos {
    position.step(facing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Npc, PlayerState, TownSnapshot};

    fn town(tiles: &[&str], npcs: Vec<Npc>) -> (TownSnapshot, OccupancyIndex) {
        let snap = TownSnapshot {
            town_id: "t".into(),
            seed: None,
            width: tiles[0].len() as u32,
            height: tiles.len() as u32,
            tiles: tiles.iter().map(|s| s.to_string()).collect(),
            npcs,
            events: vec![],
            allowed_event_ids: vec![],
            version: 1,
            player_state: PlayerState::default(),
        };
        let idx = OccupancyIndex::build(&snap);
        (snap, idx)
    }

    fn npc_at(x: i32, y: i32) -> Npc {
        Npc {
            npc_id: "npc_lyra".into(),
            name_key: "npc.npc_lyra".into(),
            pos: GridPos::new(x, y),
            event_ids: vec![],
        }
    }

    #[test]
    fn moves_onto_passable_tiles() {
        let (s, idx) = town(&["GPB"], vec![]);
        let p = attempt_move(GridPos::new(0, 0), Direction::East, &s, &idx);
        assert_eq!(p, GridPos::new(1, 0));
        let p = attempt_move(p, Direction::East, &s, &idx);
        assert_eq!(p, GridPos::new(2, 0));
    }

    #[test]
    fn rejects_out_of_bounds_on_every_edge() {
        let (s, idx) = town(&["G"], vec![]);
        for d in Direction::ALL {
            assert_eq!(
                check_move(GridPos::new(0, 0), d, &s, &idx),
                Err(MoveBlocked::OutOfBounds)
            );
        }
    }

    #[test]
    fn rejects_walls_and_unknown_tiles() {
        let (s, idx) = town(&["GWX"], vec![]);
        assert_eq!(
            check_move(GridPos::new(0, 0), Direction::East, &s, &idx),
            Err(MoveBlocked::Impassable('W'))
        );
        assert_eq!(
            check_move(GridPos::new(1, 0), Direction::East, &s, &idx),
            Err(MoveBlocked::Impassable('X'))
        );
    }

    #[test]
    fn rejects_npc_cells() {
        let (s, idx) = town(&["GGG"], vec![npc_at(1, 0)]);
        assert_eq!(
            check_move(GridPos::new(0, 0), Direction::East, &s, &idx),
            Err(MoveBlocked::Occupied)
        );
        assert_eq!(
            attempt_move(GridPos::new(0, 0), Direction::East, &s, &idx),
            GridPos::new(0, 0)
        );
    }

    #[test]
    fn exhaustive_rule_check_on_mixed_grid() {
        let (s, idx) = town(&["GWGPG", "BGGXG", "GGWGG"], vec![npc_at(2, 1)]);
        for y in 0..3 {
            for x in 0..5 {
                let p = GridPos::new(x, y);
                for d in Direction::ALL {
                    let c = p.step(d);
                    let legal = s.contains(c)
                        && s.tile_at(c).map(crate::terrain::is_passable).unwrap_or(false)
                        && !idx.is_blocked(c);
                    let expected = if legal { c } else { p };
                    assert_eq!(attempt_move(p, d, &s, &idx), expected, "{p} {d}");
                }
            }
        }
    }

    #[test]
    fn first_open_cell_skips_walls_and_npcs() {
        let (s, idx) = town(&["WWW", "WGG"], vec![npc_at(1, 1)]);
        assert_eq!(first_open_cell(&s, &idx), Some(GridPos::new(2, 1)));

        let (s, idx) = town(&["WW", "WX"], vec![]);
        assert_eq!(first_open_cell(&s, &idx), None);
    }

    #[test]
    fn target_ignores_terrain() {
        assert_eq!(
            compute_target(GridPos::new(1, 1), Direction::North),
            GridPos::new(1, 0)
        );
        assert_eq!(
            compute_target(GridPos::new(0, 0), Direction::West),
            GridPos::new(-1, 0)
        );
    }
}
