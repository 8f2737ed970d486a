//! Admin roles and permissions

use serde::{Deserialize, Serialize};

/// Permission id granting everything
pub const ALL_PERMISSIONS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
}

impl Permission {
    pub fn new(id: &str, name: &str, category: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
    pub user_count: u32,
    pub created_at: String,
    /// System roles cannot be deleted
    pub is_system: bool,
}

impl Role {
    pub fn grants(&self, permission_id: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p == ALL_PERMISSIONS || p == permission_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(permissions: &[&str]) -> Role {
        Role {
            id: "role-x".into(),
            name: "X".into(),
            description: String::new(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            user_count: 0,
            created_at: "2024-01-01".into(),
            is_system: false,
        }
    }

    #[test]
    fn test_wildcard_grants_everything() {
        assert!(role(&["all"]).grants("system.settings"));
    }

    #[test]
    fn test_explicit_grant() {
        let auditor = role(&["audit.view", "reports.view"]);
        assert!(auditor.grants("reports.view"));
        assert!(!auditor.grants("reports.generate"));
    }
}
