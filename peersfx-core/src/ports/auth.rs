//! Auth service port

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::result::Result;
use crate::domain::AuthUser;

/// Snapshot of the external auth state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub is_loading: bool,
}

impl AuthState {
    /// Initial state before the auth service has answered
    pub fn loading() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    pub fn signed_in(user: AuthUser) -> Self {
        Self {
            user: Some(user),
            is_loading: false,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: None,
            is_loading: false,
        }
    }

    /// The user, but only once loading has finished
    pub fn ready_user(&self) -> Option<&AuthUser> {
        if self.is_loading {
            None
        } else {
            self.user.as_ref()
        }
    }
}

/// External authentication service
///
/// The state is exposed as a watch channel: every receiver sees the latest
/// value and is woken on each change. Dropping the receiver unsubscribes.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Subscribe to auth state changes
    fn auth_state(&self) -> watch::Receiver<AuthState>;

    /// Start the external login flow, returning to `redirect_path` afterwards
    async fn login(&self, redirect_path: &str) -> Result<()>;

    /// Sign the current user out
    async fn logout(&self) -> Result<()>;
}
