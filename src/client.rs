//! `TownClient`: async driver connecting a [`TownSession`] to a transport.
//!
//! ## Usage
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use town_client::{ClientConfig, HttpTransport, TownClient, TownSession, Direction};
//!
//! let config = ClientConfig::load(None)?;
//! let client = TownClient::new(HttpTransport::new(&config)?, config.dialog_pack.clone());
//!
//! let loaded = client.load().await?;
//! let mut session = TownSession::new(loaded.content, loaded.snapshot, config.start_position(), config.start_facing);
//!
//! session.step(Direction::East);
//! let outcome = client.interact(&mut session).await;
//! println!("{outcome:?} -> {}", session.status());
//! # Ok(())
//! # }
//! ```

use crate::content::{Content, DialogPack, UiStrings};
use crate::error::{ClientError, LoadError};
use crate::events::InteractionOutcome;
use crate::protocol::{EventReply, EventRequest, RawReply, TownSnapshot};
use crate::session::TownSession;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// The four remote calls the client makes.
///
/// `post_event` returns the raw status and body; classification into
/// [`EventReply`] is shared by every transport.
#[allow(async_fn_in_trait)]
pub trait TownTransport {
    async fn fetch_ui(&self) -> Result<UiStrings, ClientError>;
    async fn fetch_dialog(&self, pack: &str) -> Result<DialogPack, ClientError>;
    async fn fetch_town(&self) -> Result<TownSnapshot, ClientError>;
    async fn post_event(&self, request: &EventRequest) -> Result<RawReply, ClientError>;
}

/// Send `request` and classify the answer.
pub async fn send_event<T: TownTransport>(
    transport: &T,
    request: &EventRequest,
) -> Result<EventReply, ClientError> {
    let raw = transport.post_event(request).await?;
    EventReply::classify(&raw)
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// Result of the initial batched load.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub content: Content,
    pub snapshot: TownSnapshot,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct TownClient<T> {
    transport: T,
    dialog_pack: String,
}

impl<T: TownTransport> TownClient<T> {
    pub fn new(transport: T, dialog_pack: impl Into<String>) -> Self {
        Self {
            transport,
            dialog_pack: dialog_pack.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch UI strings, the dialog pack and the town snapshot concurrently.
    /// The first failure fails the whole load.
    pub async fn load(&self) -> Result<Loaded, LoadError> {
        let (ui, dialog, snapshot) = tokio::try_join!(
            self.transport.fetch_ui(),
            self.transport.fetch_dialog(&self.dialog_pack),
            self.transport.fetch_town(),
        )
        .map_err(|err| {
            log::error!("Town load failed: {}", err);
            LoadError(err)
        })?;

        log::info!(
            "Loaded town {} v{} ({}x{}, {} npcs, {} events)",
            snapshot.town_id,
            snapshot.version,
            snapshot.width,
            snapshot.height,
            snapshot.npcs.len(),
            snapshot.events.len()
        );
        Ok(Loaded {
            content: Content { ui, dialog },
            snapshot,
        })
    }

    /// Run one full interaction: resolve the target locally, send at most one
    /// request, reconcile the reply.
    pub async fn interact(&self, session: &mut TownSession) -> InteractionOutcome {
        let request = match session.begin_interaction() {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };
        let reply = send_event(&self.transport, &request).await;
        session.finish_interaction(reply)
    }
}
