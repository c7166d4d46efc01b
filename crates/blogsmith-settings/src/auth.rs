use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Whoever is asking for settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn admin(name: impl Into<String>) -> Self {
        Self::new(name, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub fn require_admin(principal: &Principal, action: &'static str) -> SettingsResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        log::warn!("{} ({:?}) denied: {action}", principal.name, principal.role);
        Err(SettingsError::PermissionDenied { action })
    }
}
