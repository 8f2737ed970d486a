//! Session gate - decides what to render from the auth state
//!
//! The gate owns a receiver on the auth service's state channel; it is
//! passed to whatever needs the current user instead of living in a global.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::result::{Error, Result};
use crate::domain::AuthUser;
use crate::ports::{AuthService, AuthState};

/// Screens of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Dashboard,
    Wallet,
    CreateOrder,
    Marketplace,
    Notifications,
    Settings,
    IdVerification,
    AdminLogin,
    AdminDashboard,
    AdminUsers,
    AdminOrders,
    AdminAnalytics,
    AdminCompliance,
    AdminRoles,
    AdminSettings,
}

impl Route {
    pub const ALL: [Route; 16] = [
        Route::Landing,
        Route::Dashboard,
        Route::Wallet,
        Route::CreateOrder,
        Route::Marketplace,
        Route::Notifications,
        Route::Settings,
        Route::IdVerification,
        Route::AdminLogin,
        Route::AdminDashboard,
        Route::AdminUsers,
        Route::AdminOrders,
        Route::AdminAnalytics,
        Route::AdminCompliance,
        Route::AdminRoles,
        Route::AdminSettings,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Dashboard => "/dashboard",
            Route::Wallet => "/wallet",
            Route::CreateOrder => "/create-order",
            Route::Marketplace => "/marketplace",
            Route::Notifications => "/notifications",
            Route::Settings => "/settings",
            Route::IdVerification => "/id-verification",
            Route::AdminLogin => "/admin/login",
            Route::AdminDashboard => "/admin",
            Route::AdminUsers => "/admin/users",
            Route::AdminOrders => "/admin/orders",
            Route::AdminAnalytics => "/admin/analytics",
            Route::AdminCompliance => "/admin/compliance",
            Route::AdminRoles => "/admin/roles",
            Route::AdminSettings => "/admin/settings",
        }
    }

    /// Requires a signed-in user. The admin console has its own login and
    /// is not gated by the user session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Landing) && !self.is_admin()
    }

    pub fn is_admin(&self) -> bool {
        self.path().starts_with("/admin")
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let path = s.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL
            .into_iter()
            .find(|r| r.path() == normalized)
            .ok_or_else(|| format!("no route for {}", s))
    }
}

/// Outcome of resolving a path against the current auth state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Auth state not known yet; show the spinner
    Loading,
    Render(Route),
    /// Replace the current location with this route
    Redirect(Route),
    NotFound,
}

pub struct SessionGate {
    auth: Arc<dyn AuthService>,
    state: watch::Receiver<AuthState>,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthService>) -> Self {
        let state = auth.auth_state();
        Self { auth, state }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Signed-in user once loading has finished
    pub fn current_user(&self) -> Option<AuthUser> {
        self.state.borrow().ready_user().cloned()
    }

    /// Like [`current_user`](Self::current_user) but an auth error when
    /// nobody is signed in
    pub fn require_user(&self) -> Result<AuthUser> {
        self.current_user()
            .ok_or_else(|| Error::Auth("Please sign in to continue".to_string()))
    }

    /// Wait for the auth service to finish loading
    pub async fn ready(&mut self) -> Result<AuthState> {
        let state = self
            .state
            .wait_for(|s| !s.is_loading)
            .await
            .map_err(|_| Error::Auth("auth service went away".to_string()))?;
        Ok(state.clone())
    }

    /// Wait for the next auth state change
    pub async fn changed(&mut self) -> Result<AuthState> {
        self.state
            .changed()
            .await
            .map_err(|_| Error::Auth("auth service went away".to_string()))?;
        Ok(self.state.borrow_and_update().clone())
    }

    pub fn resolve(&self, path: &str) -> RouteDecision {
        resolve_route(&self.state.borrow(), path)
    }

    pub async fn login(&self, redirect_path: &str) -> Result<()> {
        self.auth.login(redirect_path).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await
    }
}

/// Route decision as a pure function of the auth state
pub fn resolve_route(state: &AuthState, path: &str) -> RouteDecision {
    if state.is_loading {
        return RouteDecision::Loading;
    }
    let Ok(route) = path.parse::<Route>() else {
        return RouteDecision::NotFound;
    };

    let signed_in = state.user.is_some();
    match route {
        Route::Landing if signed_in => RouteDecision::Redirect(Route::Dashboard),
        r if r.is_protected() && !signed_in => RouteDecision::Redirect(Route::Landing),
        r => RouteDecision::Render(r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticAuthService;

    fn user() -> AuthUser {
        AuthUser::new("u1", "alice@example.com")
    }

    #[test]
    fn test_loading_shows_spinner_everywhere() {
        let state = AuthState::loading();
        assert_eq!(resolve_route(&state, "/"), RouteDecision::Loading);
        assert_eq!(resolve_route(&state, "/wallet"), RouteDecision::Loading);
    }

    #[test]
    fn test_signed_out_redirects_protected_routes() {
        let state = AuthState::signed_out();
        assert_eq!(resolve_route(&state, "/"), RouteDecision::Render(Route::Landing));
        assert_eq!(
            resolve_route(&state, "/marketplace"),
            RouteDecision::Redirect(Route::Landing)
        );
        assert_eq!(
            resolve_route(&state, "/admin/users"),
            RouteDecision::Render(Route::AdminUsers)
        );
    }

    #[test]
    fn test_signed_in_skips_landing() {
        let state = AuthState::signed_in(user());
        assert_eq!(resolve_route(&state, "/"), RouteDecision::Redirect(Route::Dashboard));
        assert_eq!(
            resolve_route(&state, "/create-order/"),
            RouteDecision::Render(Route::CreateOrder)
        );
        assert_eq!(resolve_route(&state, "/nowhere"), RouteDecision::NotFound);
    }

    #[test]
    fn test_route_parsing_ignores_query() {
        assert_eq!("/wallet?tab=eur".parse::<Route>(), Ok(Route::Wallet));
        assert_eq!("/admin".parse::<Route>(), Ok(Route::AdminDashboard));
    }

    #[tokio::test]
    async fn test_gate_follows_auth_changes() {
        let auth = Arc::new(StaticAuthService::new(Some(user())));
        let mut gate = SessionGate::new(auth.clone());
        assert_eq!(gate.resolve("/dashboard"), RouteDecision::Loading);
        assert!(gate.require_user().is_err());

        auth.set_state(AuthState::signed_out());
        let state = gate.ready().await.unwrap();
        assert!(state.user.is_none());

        gate.login("/dashboard").await.unwrap();
        let state = gate.changed().await.unwrap();
        assert_eq!(state.user.map(|u| u.id), Some("u1".to_string()));
        assert_eq!(gate.resolve("/dashboard"), RouteDecision::Render(Route::Dashboard));
    }
}
