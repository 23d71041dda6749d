use serde::{Deserialize, Serialize};

use stockbook_core::UserId;

use crate::Role;

/// The authenticated identity performing an operation.
///
/// Its id is what gets stamped into `created_by`, `opened_by`, etc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn new(id: UserId, name: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            id,
            name: name.into(),
            roles,
        }
    }

    /// Convenience constructor for an actor holding the `admin` role.
    pub fn admin(name: impl Into<String>) -> Self {
        Self::new(UserId::new(), name, vec![Role::ADMIN])
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
