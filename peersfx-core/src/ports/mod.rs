//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The services
//! depend only on these traits, never on a concrete backend.

pub mod auth;
pub mod data_store;
pub mod realtime;
pub mod storage;
mod toast;

pub use auth::{AuthService, AuthState};
pub use data_store::{Collection, DataStore, ListQuery, SortDirection};
pub use realtime::{RealtimeBus, RealtimeMessage, Subscription};
pub use storage::{ObjectStorage, ProgressFn, UploadFile, UploadOptions, UploadResult};
pub use toast::ToastSink;
