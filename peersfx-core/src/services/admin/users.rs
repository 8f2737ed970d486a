//! User roster for the admin console
//!
//! Actions change the local roster only; there is no remote admin API.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::info;

use crate::domain::result::{Error, Result};
use crate::domain::{KycStatus, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Suspend,
    Activate,
    Verify,
    ApproveKyc,
    RejectKyc,
}

impl UserAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserAction::Suspend => "suspend",
            UserAction::Activate => "activate",
            UserAction::Verify => "verify",
            UserAction::ApproveKyc => "approve_kyc",
            UserAction::RejectKyc => "reject_kyc",
        }
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "suspend" => Ok(UserAction::Suspend),
            "activate" => Ok(UserAction::Activate),
            "verify" => Ok(UserAction::Verify),
            "approve_kyc" => Ok(UserAction::ApproveKyc),
            "reject_kyc" => Ok(UserAction::RejectKyc),
            other => Err(format!("unknown user action: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: usize,
    pub verified: usize,
    pub pending_kyc: usize,
    pub active: usize,
}

pub struct UserDirectory {
    users: Vec<UserProfile>,
}

impl UserDirectory {
    pub fn new(users: Vec<UserProfile>) -> Self {
        Self { users }
    }

    pub fn users(&self) -> &[UserProfile] {
        &self.users
    }

    pub fn get(&self, id: &str) -> Option<&UserProfile> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Case-insensitive search over email and display name
    pub fn search(&self, term: &str) -> Vec<&UserProfile> {
        self.users.iter().filter(|u| u.matches_search(term)).collect()
    }

    pub fn stats(&self) -> UserStats {
        UserStats {
            total: self.users.len(),
            verified: self.users.iter().filter(|u| u.is_verified).count(),
            pending_kyc: self
                .users
                .iter()
                .filter(|u| u.kyc_status == KycStatus::Pending)
                .count(),
            active: self.users.iter().filter(|u| u.is_active).count(),
        }
    }

    pub fn apply(&mut self, user_id: &str, action: UserAction) -> Result<&UserProfile> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| Error::not_found(format!("user {}", user_id)))?;

        match action {
            UserAction::Suspend => user.is_active = false,
            UserAction::Activate => user.is_active = true,
            UserAction::Verify => user.is_verified = true,
            UserAction::ApproveKyc => {
                user.kyc_status = KycStatus::Approved;
                user.is_verified = true;
            }
            UserAction::RejectKyc => {
                user.kyc_status = KycStatus::Rejected;
                user.is_verified = false;
            }
        }
        info!(user_id, action = action.as_str(), "user action applied");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::demo;

    #[test]
    fn test_search_is_case_insensitive() {
        let dir = UserDirectory::new(demo::admin_users());
        assert_eq!(dir.search("JANE").len(), 1);
        assert_eq!(dir.search("email.com").len(), 5);
        assert!(dir.search("nobody").is_empty());
    }

    #[test]
    fn test_stats() {
        let dir = UserDirectory::new(demo::admin_users());
        assert_eq!(
            dir.stats(),
            UserStats {
                total: 5,
                verified: 2,
                pending_kyc: 2,
                active: 4
            }
        );
    }

    #[test]
    fn test_actions_update_roster() {
        let mut dir = UserDirectory::new(demo::admin_users());
        assert!(!dir.apply("3", UserAction::Activate).unwrap().is_verified);
        assert!(dir.get("3").unwrap().is_active);

        let approved = dir.apply("2", UserAction::ApproveKyc).unwrap();
        assert_eq!(approved.kyc_status, KycStatus::Approved);
        assert!(approved.is_verified);

        dir.apply("1", UserAction::Suspend).unwrap();
        assert_eq!(dir.stats().active, 4);
        assert!(dir.apply("99", UserAction::Verify).is_err());
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("approve-kyc".parse::<UserAction>(), Ok(UserAction::ApproveKyc));
        assert!("ban".parse::<UserAction>().is_err());
    }
}
