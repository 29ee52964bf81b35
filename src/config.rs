//! Client configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `TOWN_*` environment variables.
//!
//! | Key                    | Env                          | Default                 |
//! |------------------------|------------------------------|-------------------------|
//! | `base_url`             | `TOWN_BASE_URL`              | `http://localhost:8000` |
//! | `game_slug`            | `TOWN_GAME_SLUG`             | `agame`                 |
//! | `dialog_pack`          | `TOWN_DIALOG_PACK`           | `town_dialog`           |
//! | `start_x` / `start_y`  | `TOWN_START_X` / `TOWN_START_Y` | `2` / `2`            |
//! | `start_facing`         | `TOWN_START_FACING`          | `south`                 |
//! | `request_timeout_secs` | `TOWN_REQUEST_TIMEOUT_SECS`  | none                    |

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Direction, GridPos};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme + host (+ port) of the deployment.
    pub base_url: String,
    /// Deployment slug. Prefixes every route and names the CSRF cookie.
    /// Empty (or `/`) means the game is mounted at the root.
    pub game_slug: String,
    pub dialog_pack: String,
    pub start_x: i32,
    pub start_y: i32,
    pub start_facing: Direction,
    /// Transport-level timeout. The interaction state machine has none.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            game_slug: "agame".into(),
            dialog_pack: "town_dialog".into(),
            start_x: 2,
            start_y: 2,
            start_facing: Direction::South,
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("game_slug", defaults.game_slug)?
            .set_default("dialog_pack", defaults.dialog_pack)?
            .set_default("start_x", i64::from(defaults.start_x))?
            .set_default("start_y", i64::from(defaults.start_y))?
            .set_default("start_facing", defaults.start_facing.as_str())?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(config::Environment::with_prefix("TOWN"));

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be http(s), got '{}'",
                self.base_url
            )));
        }
        if self.dialog_pack.is_empty() || self.dialog_pack.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "dialog_pack must be a bare name, got '{}'",
                self.dialog_pack
            )));
        }
        Ok(())
    }

    /// Slug with surrounding slashes removed.
    pub fn slug(&self) -> &str {
        self.game_slug.trim_matches('/')
    }

    /// `/<slug>`, or empty when mounted at the root.
    pub fn url_prefix(&self) -> String {
        match self.slug() {
            "" => String::new(),
            slug => format!("/{slug}"),
        }
    }

    /// Absolute API base, always with a trailing slash.
    pub fn api_base(&self) -> String {
        format!("{}{}/api/", self.base_url.trim_end_matches('/'), self.url_prefix())
    }

    /// Absolute content base, always with a trailing slash.
    pub fn content_base(&self) -> String {
        format!(
            "{}{}/content/",
            self.base_url.trim_end_matches('/'),
            self.url_prefix()
        )
    }

    pub fn csrf_cookie(&self) -> String {
        match self.slug() {
            "" => "game_csrf".into(),
            slug => format!("{slug}_csrf"),
        }
    }

    pub fn start_position(&self) -> GridPos {
        GridPos::new(self.start_x, self.start_y)
    }
}
