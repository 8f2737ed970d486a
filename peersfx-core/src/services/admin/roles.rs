//! Roles and permissions for admin staff

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;

use crate::domain::ids::generate_id;
use crate::domain::result::{Error, Result};
use crate::domain::{Permission, Role, ALL_PERMISSIONS};

pub struct RoleCatalog {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
}

impl RoleCatalog {
    pub fn new(roles: Vec<Role>, permissions: Vec<Permission>) -> Self {
        Self { roles, permissions }
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn get(&self, role_id: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == role_id)
    }

    /// False for unknown roles
    pub fn has_permission(&self, role_id: &str, permission_id: &str) -> bool {
        self.get(role_id).is_some_and(|r| r.grants(permission_id))
    }

    /// Permission catalog grouped by category, categories in name order
    pub fn permissions_by_category(&self) -> BTreeMap<&str, Vec<&Permission>> {
        let mut groups: BTreeMap<&str, Vec<&Permission>> = BTreeMap::new();
        for p in &self.permissions {
            groups.entry(p.category.as_str()).or_default().push(p);
        }
        groups
    }

    /// Add a custom role. Every permission id must exist in the catalog
    /// (or be the `all` wildcard) and the name must be unused.
    pub fn create_role(
        &mut self,
        name: &str,
        description: &str,
        permissions: Vec<String>,
    ) -> Result<&Role> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("role name is required"));
        }
        if self.roles.iter().any(|r| r.name.eq_ignore_ascii_case(name)) {
            return Err(Error::validation(format!("role {} already exists", name)));
        }
        let unknown: Vec<&str> = permissions
            .iter()
            .map(String::as_str)
            .filter(|p| *p != ALL_PERMISSIONS && !self.permissions.iter().any(|k| k.id == *p))
            .collect();
        if !unknown.is_empty() {
            return Err(Error::validation(format!(
                "unknown permissions: {}",
                unknown.join(", ")
            )));
        }

        let role = Role {
            id: generate_id("role"),
            name: name.to_string(),
            description: description.trim().to_string(),
            permissions,
            user_count: 0,
            created_at: Utc::now().format("%Y-%m-%d").to_string(),
            is_system: false,
        };
        info!(role_id = %role.id, "role created");
        self.roles.push(role);
        Ok(&self.roles[self.roles.len() - 1])
    }

    pub fn delete_role(&mut self, role_id: &str) -> Result<Role> {
        let index = self
            .roles
            .iter()
            .position(|r| r.id == role_id)
            .ok_or_else(|| Error::not_found(format!("role {}", role_id)))?;
        if self.roles[index].is_system {
            return Err(Error::validation(format!(
                "{} is a system role and cannot be deleted",
                self.roles[index].name
            )));
        }
        info!(role_id, "role deleted");
        Ok(self.roles.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::demo;

    fn catalog() -> RoleCatalog {
        RoleCatalog::new(demo::roles(), demo::permissions())
    }

    #[test]
    fn test_wildcard_and_unknown_role() {
        let c = catalog();
        assert!(c.has_permission("role-1", "system.settings"));
        assert!(c.has_permission("role-6", "logs.view"));
        assert!(!c.has_permission("role-6", "users.manage"));
        assert!(!c.has_permission("role-x", "users.view"));
    }

    #[test]
    fn test_grouping() {
        let c = catalog();
        let groups = c.permissions_by_category();
        assert_eq!(groups["User Management"].len(), 3);
        assert_eq!(groups.values().map(Vec::len).sum::<usize>(), c.permissions().len());
    }

    #[test]
    fn test_create_role() {
        let mut c = catalog();
        let role = c
            .create_role("Treasury", "Moves money", vec!["orders.view".into(), "reports.view".into()])
            .unwrap();
        assert!(role.id.starts_with("role_"));
        assert!(!role.is_system);
        let id = role.id.clone();
        assert!(c.has_permission(&id, "reports.view"));

        assert!(c.create_role("treasury", "", vec![]).is_err());
        assert!(c.create_role("Other", "", vec!["time.travel".into()]).is_err());
        assert!(c.create_role("  ", "", vec![]).is_err());
    }

    #[test]
    fn test_delete_role() {
        let mut c = catalog();
        assert!(c.delete_role("role-1").unwrap_err().is_validation());
        assert_eq!(c.delete_role("role-6").unwrap().name, "Auditor");
        assert!(matches!(c.delete_role("role-6"), Err(Error::NotFound(_))));
    }
}
