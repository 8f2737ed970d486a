//! CLI command implementations

pub mod admin;
pub mod demo;
pub mod kyc;
pub mod logs;
pub mod market;
pub mod notifications;
pub mod order;
pub mod wallet;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use peersfx_core::adapters::InMemoryDataStore;
use peersfx_core::{AuthUser, EntryPoint, LogEvent, LoggingService, PeersFxContext};

use crate::output::TerminalToaster;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Data directory from `PEERSFX_DIR` or `~/.peersfx`
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PEERSFX_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".peersfx"))
        .ok_or_else(|| anyhow!("Could not find home directory; set PEERSFX_DIR"))
}

/// Build the context for one command
///
/// With `offline` the data store rejects every call, which shows the
/// sample-data fallback paths.
pub async fn get_context(offline: bool) -> Result<PeersFxContext> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let mut ctx = PeersFxContext::with_toasts(&data_dir, Arc::new(TerminalToaster))
        .context("Failed to initialize PeersFX context")?;
    if offline {
        let store = InMemoryDataStore::new();
        store.set_offline(true);
        ctx.store = Arc::new(store);
    } else {
        ctx.seed_demo_data().await?;
    }
    Ok(ctx)
}

/// Wait for the session and return the signed-in user
pub async fn signed_in_user(ctx: &PeersFxContext) -> Result<AuthUser> {
    let mut session = ctx.session();
    session.ready().await?;
    Ok(session.require_user()?)
}
