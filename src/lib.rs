//! Town Client
//!
//! Client-side model and protocol driver for a grid-based town explorer whose
//! state is owned by a remote town service.
//!
//! ## Architecture
//!
//! ```text
//! TownClient  (client.rs)     ← async driver, batched load
//!   ├── HttpTransport  (http.rs)   ← reqwest, cookies, CSRF
//!   └── TownSession  (session.rs)  ← position, facing, Idle/Pending
//!         ├── TownCache  (cache.rs) ← snapshot + occupancy index
//!         ├── movement.rs           ← move / target resolution
//!         └── terrain.rs            ← tile passability
//! ```
//!
//! Movement and target resolution are local and synchronous. Only an
//! interaction talks to the service, and at most one is in flight. Every
//! accepted snapshot replaces local state wholesale.

// Model, protocol and state machine are always available.
pub mod cache;
pub mod content;
pub mod error;
pub mod events;
pub mod input;
pub mod movement;
pub mod protocol;
pub mod render;
pub mod session;
pub mod terrain;
pub mod types;

// Configuration (always present – the binary and tests both load it).
pub mod config;

// Async driver + HTTP transport require the `net` feature.
#[cfg(feature = "net")]
pub mod client;
#[cfg(feature = "net")]
pub mod http;

// Convenience re-exports
pub use cache::{OccupancyIndex, TownCache};
pub use config::ClientConfig;
pub use content::{Content, DialogPack, UiStrings};
pub use error::{ClientError, ConfigError, LoadError};
pub use events::{ClientEvent, InteractionOutcome};
pub use movement::{attempt_move, compute_target};
pub use protocol::{EventReply, EventRequest, RawReply, TownSnapshot};
pub use session::{InteractionState, TownSession};
pub use terrain::{is_passable, Terrain, TileSource};
pub use types::{Direction, GridPos};

#[cfg(feature = "net")]
pub use client::{Loaded, TownClient, TownTransport};
#[cfg(feature = "net")]
pub use http::HttpTransport;
