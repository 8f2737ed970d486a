//! PeersFX Core - Business logic for the peer-to-peer exchange marketplace
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Order, Notification, KYC record, etc.)
//! - **ports**: Trait definitions for external collaborators (auth, data store,
//!   realtime bus, object storage, toasts)
//! - **services**: Business logic orchestration
//! - **adapters**: In-process implementations of the ports and sample data

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

mod log_migrations;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::{
    demo, InMemoryDataStore, InMemoryObjectStorage, LocalRealtimeBus, StaticAuthService,
    TracingToaster,
};
use config::Config;
use ports::{AuthService, DataStore, ObjectStorage, RealtimeBus, ToastSink};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{AuthUser, Notification, Order, OrderStatus, OrderType, Toast};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for PeersFX operations
///
/// Holds the configuration and one instance of every port. Services are
/// created on demand and own their state; they share only the ports.
pub struct PeersFxContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub auth: Arc<dyn AuthService>,
    pub store: Arc<dyn DataStore>,
    pub realtime: Arc<dyn RealtimeBus>,
    pub storage: Arc<dyn ObjectStorage>,
    pub toasts: Arc<dyn ToastSink>,
}

impl PeersFxContext {
    /// Context over the in-process adapters, signed in as the demo user
    ///
    /// Toasts are written to the tracing log.
    pub fn new(data_dir: &Path) -> Result<Self> {
        Self::with_toasts(data_dir, Arc::new(TracingToaster))
    }

    pub fn with_toasts(data_dir: &Path, toasts: Arc<dyn ToastSink>) -> Result<Self> {
        let config = Config::load(data_dir)
            .with_context(|| format!("Failed to load settings from {:?}", data_dir))?;

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            auth: Arc::new(StaticAuthService::signed_in(demo::demo_user())),
            store: Arc::new(InMemoryDataStore::new()),
            realtime: Arc::new(LocalRealtimeBus::new()),
            storage: Arc::new(InMemoryObjectStorage::default()),
            toasts,
        })
    }

    /// Fill the store with the sample orders and notifications when demo
    /// mode is on. Returns whether anything was seeded.
    pub async fn seed_demo_data(&self) -> Result<bool> {
        if !self.config.demo_mode {
            return Ok(false);
        }
        demo::seed_store(self.store.as_ref())
            .await
            .context("Failed to seed demo data")?;
        Ok(true)
    }

    pub fn session(&self) -> SessionGate {
        SessionGate::new(Arc::clone(&self.auth))
    }

    pub fn marketplace(&self) -> MarketplaceService {
        MarketplaceService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.realtime),
            Arc::clone(&self.toasts),
            self.config.marketplace.order_limit,
        )
    }

    pub fn order_form(&self) -> OrderFormService {
        OrderFormService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.realtime),
            Arc::clone(&self.toasts),
        )
    }

    pub fn kyc_wizard(&self) -> KycWizard {
        KycWizard::new(
            Arc::clone(&self.store),
            Arc::clone(&self.storage),
            Arc::clone(&self.realtime),
            Arc::clone(&self.toasts),
            self.config.kyc.max_document_bytes,
        )
    }

    pub fn notification_center(&self) -> NotificationCenter {
        NotificationCenter::new(
            Arc::clone(&self.store),
            Arc::clone(&self.realtime),
            Arc::clone(&self.toasts),
            self.config.notifications.limit,
            self.config.notifications.sync_mutations,
        )
    }

    pub fn admin_console(&self) -> AdminConsole {
        AdminConsole::demo(&self.config)
    }
}
