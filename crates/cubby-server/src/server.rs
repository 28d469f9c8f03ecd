//! TCP listener and accept loop.
//!
//! Accepts client connections and spawns one handler task per
//! connection. Handles graceful shutdown on SIGINT: stops accepting new
//! connections and waits for in-flight handlers to drain before exiting.

use std::net::SocketAddr;
use std::sync::Arc;

use cubby_core::SessionRegistry;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::CubbyConfig;
use crate::connection::{self, ConnLimits};

/// Binds to `addr` and runs the accept loop.
///
/// Builds the shared session registry from the config, then hands every
/// incoming connection a cheap clone of the registry handle. Concurrent
/// connections are capped at `maxclients` — excess sockets are dropped
/// at accept time. Accept errors are logged and the loop continues;
/// per-connection errors never reach this level.
pub async fn run(addr: SocketAddr, cfg: &CubbyConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = SessionRegistry::shared(cfg.max_sessions, cfg.max_entries);
    let limits = ConnLimits {
        max_line_len: cfg.max_line_len,
        fields: cfg.field_limits(),
    };

    let listener = TcpListener::bind(addr).await?;
    let max_conn = cfg.maxclients;
    let semaphore = Arc::new(Semaphore::new(max_conn));

    info!(
        "listening on {addr} (max {} sessions, {max_conn} connections)",
        cfg.max_sessions
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("shutdown signal received, draining connections...");
                break;
            }

            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!("accept error: {e}");
                        continue;
                    }
                };

                let permit = match semaphore.clone().try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        warn!("connection limit reached, dropping connection from {peer}");
                        drop(stream);
                        continue;
                    }
                };

                let registry = registry.clone();

                tokio::spawn(async move {
                    if let Err(e) = connection::handle(stream, registry, limits).await {
                        error!("connection error from {peer}: {e}");
                    }
                    // permit is dropped here, releasing the slot
                    drop(permit);
                });
            }
        }
    }

    // wait for all connection handlers to finish by acquiring all permits
    info!("waiting for active connections to close...");
    let _ = semaphore.acquire_many(max_conn as u32).await;
    info!("all connections drained, shutting down");

    Ok(())
}
