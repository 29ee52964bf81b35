//! Key bindings.

use crate::types::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Move(Direction),
    Interact,
    Quit,
}

impl InputAction {
    /// Map a key name (`"w"`, `"ArrowUp"`, `" "`, ...) to an action.
    pub fn from_key(key: &str) -> Option<Self> {
        let action = match key {
            "ArrowUp" | "w" | "W" => InputAction::Move(Direction::North),
            "ArrowDown" | "s" | "S" => InputAction::Move(Direction::South),
            "ArrowLeft" | "a" | "A" => InputAction::Move(Direction::West),
            "ArrowRight" | "d" | "D" => InputAction::Move(Direction::East),
            "e" | "E" | " " => InputAction::Interact,
            "q" | "Q" | "Escape" => InputAction::Quit,
            _ => return None,
        };
        Some(action)
    }

    /// Treat every character of a typed line as one key press. Unbound
    /// characters are skipped.
    pub fn parse_line(line: &str) -> Vec<Self> {
        let mut buf = [0u8; 4];
        line.chars()
            .filter_map(|c| Self::from_key(c.encode_utf8(&mut buf)))
            .collect()
    }
}
