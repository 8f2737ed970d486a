//! Adapter implementations
//!
//! Adapters implement the port traits for in-process use:
//! - Static identity for the AuthService port
//! - JSON document store for DataStore
//! - Channel fan-out for RealtimeBus
//! - Checksummed byte store for ObjectStorage
//! - Recording and tracing sinks for ToastSink
//! - Sample datasets for fallbacks and demo sessions

pub mod auth;
pub mod demo;
pub mod memory;
pub mod realtime;
pub mod storage;
pub mod toast;

pub use auth::StaticAuthService;
pub use memory::InMemoryDataStore;
pub use realtime::LocalRealtimeBus;
pub use storage::InMemoryObjectStorage;
pub use toast::{RecordingToaster, TracingToaster};
