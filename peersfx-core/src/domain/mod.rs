//! Core domain entities
//!
//! All business entities are defined here. These are plain data structures
//! with validation logic - no I/O or external dependencies.

pub mod compliance;
pub mod currency;
pub mod ids;
pub mod kyc;
mod notification;
mod order;
pub mod result;
mod role;
mod toast;
mod user;
pub mod wallet;

pub use compliance::{AlertStatus, AlertType, ComplianceAlert, ComplianceThresholds, Severity};
pub use kyc::{
    DocumentSlot, DocumentType, DocumentsUploaded, KycRecord, KycStep, PersonalInfo,
    UploadedDocument,
};
pub use notification::{Notification, NotificationType};
pub use order::{compute_total, format_money, Order, OrderStatus, OrderType};
pub use role::{Permission, Role, ALL_PERMISSIONS};
pub use toast::{Toast, ToastVariant};
pub use user::{is_valid_email, AuthUser, KycStatus, UserProfile};
pub use wallet::{WalletBalance, WalletSummary};
