//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! owns its own state and talks to the outside world only through ports.

pub mod admin;
pub mod kyc;
pub mod logging;
pub mod marketplace;
pub mod notifications;
pub mod order_form;
pub mod session;

pub use admin::AdminConsole;
pub use kyc::KycWizard;
pub use logging::{EntryPoint, LogEntry, LogEvent, LogStats, LoggingService};
pub use marketplace::{EventOutcome, LoadOutcome, MarketFilter, MarketplaceService, SortKey};
pub use notifications::{NotificationCenter, ReadFilter};
pub use order_form::{OrderForm, OrderFormService};
pub use session::{resolve_route, Route, RouteDecision, SessionGate};
