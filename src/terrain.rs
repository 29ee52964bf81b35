//! Terrain subsystem: tile classification, the `TileSource` trait and its
//! implementation over a town snapshot's character grid.

use crate::protocol::TownSnapshot;
use crate::types::GridPos;

// ---------------------------------------------------------------------------
// Tile classes
// ---------------------------------------------------------------------------

/// Terrain class of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Wall,
    Grass,
    Path,
    Bridge,
    /// Any character the client does not recognise.
    Unknown,
}

impl Terrain {
    pub fn from_char(tile: char) -> Self {
        match tile {
            'W' => Terrain::Wall,
            'G' => Terrain::Grass,
            'P' => Terrain::Path,
            'B' => Terrain::Bridge,
            _ => Terrain::Unknown,
        }
    }

    /// Grass, path and bridge are passable. Walls and unknown tiles are not.
    pub fn is_passable(self) -> bool {
        matches!(self, Terrain::Grass | Terrain::Path | Terrain::Bridge)
    }
}

/// Passability of a raw tile character.
pub fn is_passable(tile: char) -> bool {
    Terrain::from_char(tile).is_passable()
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Anything that can answer "what tile is at this cell".
pub trait TileSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Tile character at `pos`, or `None` when out of bounds (or when a row
    /// is shorter than the declared width).
    fn tile_at(&self, pos: GridPos) -> Option<char>;

    fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as u32) < self.width()
            && (pos.y as u32) < self.height()
    }

    fn terrain_at(&self, pos: GridPos) -> Option<Terrain> {
        self.tile_at(pos).map(Terrain::from_char)
    }
}

impl TileSource for TownSnapshot {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn tile_at(&self, pos: GridPos) -> Option<char> {
        if !self.contains(pos) {
            return None;
        }
        self.tiles
            .get(pos.y as usize)
            .and_then(|row| row.chars().nth(pos.x as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PlayerState;

    fn snapshot(tiles: &[&str]) -> TownSnapshot {
        TownSnapshot {
            town_id: "t".into(),
            seed: None,
            width: tiles[0].len() as u32,
            height: tiles.len() as u32,
            tiles: tiles.iter().map(|s| s.to_string()).collect(),
            npcs: vec![],
            events: vec![],
            allowed_event_ids: vec![],
            version: 1,
            player_state: PlayerState::default(),
        }
    }

    #[test]
    fn only_grass_path_bridge_pass() {
        assert!(is_passable('G'));
        assert!(is_passable('P'));
        assert!(is_passable('B'));
        assert!(!is_passable('W'));
    }

    #[test]
    fn unknown_tiles_are_impassable() {
        for c in ['X', 'g', ' ', '?', '~'] {
            assert_eq!(Terrain::from_char(c), Terrain::Unknown);
            assert!(!is_passable(c));
        }
    }

    #[test]
    fn tile_lookup_respects_bounds() {
        let s = snapshot(&["WGP", "BGW"]);
        assert_eq!(s.tile_at(GridPos::new(0, 0)), Some('W'));
        assert_eq!(s.tile_at(GridPos::new(2, 0)), Some('P'));
        assert_eq!(s.tile_at(GridPos::new(0, 1)), Some('B'));
        assert_eq!(s.tile_at(GridPos::new(3, 0)), None);
        assert_eq!(s.tile_at(GridPos::new(0, 2)), None);
        assert_eq!(s.tile_at(GridPos::new(-1, 0)), None);
        assert_eq!(s.terrain_at(GridPos::new(1, 1)), Some(Terrain::Grass));
    }

    #[test]
    fn short_row_reads_as_missing() {
        let mut s = snapshot(&["GGG", "GGG"]);
        s.tiles[1] = "G".into();
        assert_eq!(s.tile_at(GridPos::new(2, 1)), None);
        assert!(s.contains(GridPos::new(2, 1)));
    }
}
