//! Partylink Demo Client
//!
//! With no arguments, runs a loopback handshake: a host endpoint with
//! fixed session metadata and a client endpoint that connects to it.
//! With an address argument, initiates a handshake against that host and
//! reports the verified session.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use partylink::engine::{JoinAction, LoggingJoin, StaticSessionMetadata, Unrestricted};
use partylink::{EndpointConfig, PartyHandshake, UdpEndpoint, VERSION};

/// Join action that forwards the verified session to the main task.
struct ChannelJoin {
    tx: mpsc::UnboundedSender<(SocketAddr, String, String)>,
}

impl JoinAction for ChannelJoin {
    fn perform_join(&self, target: SocketAddr, mapname: &str, gametype: &str) {
        let _ = self
            .tx
            .send((target, mapname.to_string(), gametype.to_string()));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Partylink v{}", VERSION);

    match std::env::args().nth(1) {
        Some(raw) => {
            let target: SocketAddr = raw.parse().context("invalid target address")?;
            connect_once(target).await
        }
        None => loopback_demo().await,
    }
}

/// Initiate against a host and wait for the verified join.
async fn connect_once(target: SocketAddr) -> anyhow::Result<()> {
    let mut client = UdpEndpoint::bind(EndpointConfig {
        bind_addr: "0.0.0.0:0".parse()?,
        ..EndpointConfig::from_env()
    })
    .await?;

    let (join_tx, mut join_rx) = mpsc::unbounded_channel();
    let party = Arc::new(PartyHandshake::new(
        Arc::new(client.sender()),
        Arc::new(StaticSessionMetadata::default()),
        Arc::new(ChannelJoin { tx: join_tx }),
        Arc::new(Unrestricted),
    ));
    party.register(client.router_mut());

    tokio::spawn(client.run());

    party.initiate(target)?;

    match tokio::time::timeout(Duration::from_secs(10), join_rx.recv()).await {
        Ok(Some((host, mapname, gametype))) => {
            info!(
                "verified party at {}: map {:?}, gametype {:?}",
                host, mapname, gametype
            );
            Ok(())
        }
        _ => anyhow::bail!("no verified response from {} within 10s", target),
    }
}

/// Host and client endpoints in one process, full handshake over loopback.
async fn loopback_demo() -> anyhow::Result<()> {
    info!("=== Loopback Handshake Demo ===");

    let mut host = UdpEndpoint::bind(EndpointConfig {
        bind_addr: "127.0.0.1:0".parse()?,
        ..EndpointConfig::default()
    })
    .await?;
    let host_addr = host.local_addr()?;

    let host_party = Arc::new(PartyHandshake::new(
        Arc::new(host.sender()),
        Arc::new(StaticSessionMetadata::new("dm", "mp_rust")),
        Arc::new(LoggingJoin),
        Arc::new(Unrestricted),
    ));
    host_party.register(host.router_mut());
    tokio::spawn(host.run());

    info!("demo host listening on {}", host_addr);
    connect_once(host_addr).await
}
