//! In-process auth service
//!
//! Holds a fixed identity. `login` signs that identity in, `logout` clears
//! it. State changes are broadcast through a watch channel.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use crate::domain::result::{Error, Result};
use crate::domain::AuthUser;
use crate::ports::{AuthService, AuthState};

pub struct StaticAuthService {
    identity: Mutex<Option<AuthUser>>,
    state: watch::Sender<AuthState>,
}

impl StaticAuthService {
    /// Start in the loading state with a known identity to sign in later
    pub fn new(identity: Option<AuthUser>) -> Self {
        let (state, _) = watch::channel(AuthState::loading());
        Self {
            identity: Mutex::new(identity),
            state,
        }
    }

    /// Already signed in as `user`
    pub fn signed_in(user: AuthUser) -> Self {
        let service = Self::new(Some(user.clone()));
        service.state.send_replace(AuthState::signed_in(user));
        service
    }

    /// Finished loading, nobody signed in
    pub fn signed_out(identity: Option<AuthUser>) -> Self {
        let service = Self::new(identity);
        service.state.send_replace(AuthState::signed_out());
        service
    }

    /// Push an arbitrary state to every subscriber
    pub fn set_state(&self, state: AuthState) {
        self.state.send_replace(state);
    }

    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }
}

#[async_trait]
impl AuthService for StaticAuthService {
    fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    async fn login(&self, redirect_path: &str) -> Result<()> {
        let identity = self
            .identity
            .lock()
            .map_err(|e| Error::Other(format!("Lock poisoned: {}", e)))?
            .clone()
            .ok_or_else(|| Error::Auth("no identity configured for login".to_string()))?;

        info!(redirect_path, user_id = %identity.id, "login");
        self.state.send_replace(AuthState::signed_in(identity));
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.state.send_replace(AuthState::signed_out());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_broadcasts_state() {
        let auth = StaticAuthService::signed_out(Some(AuthUser::new("u1", "u1@example.com")));
        let mut rx = auth.auth_state();
        assert!(rx.borrow().user.is_none());

        auth.login("/dashboard").await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().user.as_ref().map(|u| u.id.as_str()), Some("u1"));

        auth.logout().await.unwrap();
        assert!(auth.current().user.is_none());
    }

    #[tokio::test]
    async fn test_login_without_identity_fails() {
        let auth = StaticAuthService::new(None);
        assert!(matches!(auth.login("/").await, Err(Error::Auth(_))));
        assert!(auth.current().is_loading);
    }
}
