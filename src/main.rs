//! Quiz Allocator · difficulty-weighted item allocation service
//!
//! - Axum HTTP API over an in-memory item pool
//! - Difficulty profiles turn a requested amount into per-tier targets,
//!   the allocator realizes them against the pool with tier fall-through
//! - Training templates/sessions built from (topic, profile, amount) rules
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   POOL_CONFIG_PATH : path to TOML config (extra profiles + optional item bank)
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod telemetry;
mod domain;
mod error;
mod config;
mod profiles;
mod planner;
mod allocator;
mod pool;
mod session;
mod seeds;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Registry is built once here and only read afterwards.
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quiz_allocator", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "quiz_allocator", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "quiz_allocator", "Shutdown signal received");
}
