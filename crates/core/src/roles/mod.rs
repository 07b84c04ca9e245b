//! User roles and the capability checks behind every route guard.
//!
//! Roles are a closed set; code asks `role.can(Capability::X)` instead of
//! comparing role strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform role carried on the user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Creator,
    Admin,
}

/// Something a route or an action requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Enter a joined community and its classroom.
    ViewCommunityAccess,
    /// Create, edit and delete one's own communities.
    ManageOwnCommunities,
    ViewCreatorDashboard,
    RequestWithdrawal,
    ManageCategories,
    ViewAdminDashboard,
    ReviewWithdrawals,
    ViewErrorLogs,
}

impl Role {
    /// Single source of truth for role capabilities.
    pub fn can(self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Admin => true,
            Role::Creator => matches!(
                capability,
                ViewCommunityAccess
                    | ManageOwnCommunities
                    | ViewCreatorDashboard
                    | RequestWithdrawal
            ),
            Role::User => matches!(capability, ViewCommunityAccess),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Creator => "creator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "creator" => Ok(Role::Creator),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Outcome of a route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// No session: send the visitor to sign up.
    RedirectToSignUp,
    /// Signed in, but the role lacks the capability.
    Forbidden,
}

/// Path unauthenticated visitors are redirected to.
pub const SIGN_UP_PATH: &str = "/signup";

/// Declarative guard: a route names the capability it needs, the guard
/// decides from the (optional) role of the current session.
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    required: Option<Capability>,
}

impl RouteGuard {
    /// Any signed-in user.
    pub fn authenticated() -> Self {
        Self { required: None }
    }

    pub fn requires(capability: Capability) -> Self {
        Self {
            required: Some(capability),
        }
    }

    pub fn check(&self, role: Option<Role>) -> Access {
        match (role, self.required) {
            (None, _) => Access::RedirectToSignUp,
            (Some(_), None) => Access::Allow,
            (Some(role), Some(capability)) if role.can(capability) => Access::Allow,
            (Some(_), Some(_)) => Access::Forbidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_capabilities() {
        assert!(Role::User.can(Capability::ViewCommunityAccess));
        assert!(!Role::User.can(Capability::ViewCreatorDashboard));
        assert!(!Role::User.can(Capability::ViewAdminDashboard));
    }

    #[test]
    fn test_creator_capabilities() {
        assert!(Role::Creator.can(Capability::ManageOwnCommunities));
        assert!(Role::Creator.can(Capability::RequestWithdrawal));
        assert!(!Role::Creator.can(Capability::ManageCategories));
        assert!(!Role::Creator.can(Capability::ReviewWithdrawals));
    }

    #[test]
    fn test_admin_has_everything() {
        for capability in [
            Capability::ViewCommunityAccess,
            Capability::ManageOwnCommunities,
            Capability::ViewCreatorDashboard,
            Capability::RequestWithdrawal,
            Capability::ManageCategories,
            Capability::ViewAdminDashboard,
            Capability::ReviewWithdrawals,
            Capability::ViewErrorLogs,
        ] {
            assert!(Role::Admin.can(capability));
        }
    }

    #[test]
    fn test_guard_redirects_anonymous() {
        let guard = RouteGuard::authenticated();
        assert_eq!(guard.check(None), Access::RedirectToSignUp);
        assert_eq!(guard.check(Some(Role::User)), Access::Allow);
    }

    #[test]
    fn test_guard_forbids_missing_capability() {
        let guard = RouteGuard::requires(Capability::ViewAdminDashboard);
        assert_eq!(guard.check(Some(Role::Creator)), Access::Forbidden);
        assert_eq!(guard.check(Some(Role::Admin)), Access::Allow);
        assert_eq!(guard.check(None), Access::RedirectToSignUp);
    }

    #[test]
    fn test_role_serde_and_parse() {
        let role: Role = serde_json::from_str("\"creator\"").unwrap();
        assert_eq!(role, Role::Creator);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }
}
