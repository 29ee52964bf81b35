//! town-client binary
//!
//! Loads a town from the town service and plays it in the terminal. Each
//! line typed on stdin is a sequence of key presses:
//!
//! | Keys              | Action            |
//! |-------------------|-------------------|
//! | `w` `a` `s` `d`   | move              |
//! | `e` or space      | interact (talk/use) |
//! | `q`               | quit              |
//!
//! ## Configuration
//!
//! See [`town_client::config`] for the `TOWN_*` environment keys. Command
//! line flags override file and environment values.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use town_client::input::InputAction;
use town_client::render;
use town_client::{
    ClientConfig, ClientError, Direction, EventReply, EventRequest, HttpTransport, TownClient,
    TownSession, TownTransport,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "town-client", about = "Explore a town in the terminal", version)]
struct Args {
    /// TOML config file
    #[arg(long, env = "TOWN_CONFIG")]
    config: Option<PathBuf>,

    /// Scheme + host of the deployment
    #[arg(long)]
    base_url: Option<String>,

    /// Deployment slug ("" for root-mounted)
    #[arg(long)]
    slug: Option<String>,

    /// Dialog pack name
    #[arg(long)]
    dialog_pack: Option<String>,

    /// Starting facing direction
    #[arg(long)]
    facing: Option<Direction>,
}

impl Args {
    fn apply(&self, config: &mut ClientConfig) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(slug) = &self.slug {
            config.game_slug = slug.clone();
        }
        if let Some(pack) = &self.dialog_pack {
            config.dialog_pack = pack.clone();
        }
        if let Some(facing) = self.facing {
            config.start_facing = facing;
        }
    }
}

type PendingReply = Pin<Box<dyn Future<Output = Result<EventReply, ClientError>>>>;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Logs on stderr, the map on stdout.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("town_client=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let mut config = ClientConfig::load(args.config.as_deref()).context("loading config")?;
    args.apply(&mut config);
    config.validate()?;

    info!(
        "Starting town-client (api={}, pack='{}')",
        config.api_base(),
        config.dialog_pack
    );

    let transport = HttpTransport::new(&config)?;
    let client = TownClient::new(transport.clone(), config.dialog_pack.clone());

    // One terminal error state for the whole load.
    let loaded = client.load().await?;
    let mut session = TownSession::new(
        loaded.content,
        loaded.snapshot,
        config.start_position(),
        config.start_facing,
    );
    println!("{}", render::render(&session));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Option<PendingReply> = None;

    loop {
        tokio::select! {
            reply = wait_reply(&mut in_flight), if in_flight.is_some() => {
                in_flight = None;
                let outcome = session.finish_interaction(reply);
                debug!(?outcome, "interaction finished");
            }

            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else { break };
                let mut quit = false;
                for action in InputAction::parse_line(&line) {
                    match action {
                        InputAction::Move(direction) => {
                            session.step(direction);
                        }
                        InputAction::Interact => {
                            if let Ok(request) = session.begin_interaction() {
                                in_flight = Some(Box::pin(post(transport.clone(), request)));
                            }
                        }
                        InputAction::Quit => {
                            quit = true;
                            break;
                        }
                    }
                }
                if quit {
                    break;
                }
            }
        }

        for event in session.poll() {
            debug!(?event, "session event");
        }
        println!("{}", render::render(&session));
    }

    info!("Leaving {} at v{}", session.snapshot().town_id, session.version());
    Ok(())
}

async fn post(transport: HttpTransport, request: EventRequest) -> Result<EventReply, ClientError> {
    let raw = transport.post_event(&request).await?;
    EventReply::classify(&raw)
}

async fn wait_reply(slot: &mut Option<PendingReply>) -> Result<EventReply, ClientError> {
    match slot {
        Some(reply) => reply.await,
        None => std::future::pending().await,
    }
}
