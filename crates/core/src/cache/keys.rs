use std::fmt;

/// Identifier of one cached remote read.
///
/// Keys that hold per-user data carry the session scope
/// (`Credentials::scope`) so one session's data can be dropped on logout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Communities,
    Community(String),
    Categories,
    /// Courses of a community.
    Courses(String),
    Course(String),
    Profile(String),
    UserAnalytics(String),
    Notifications(String),
    Withdrawals(String),
    AdminAnalytics(String),
    ErrorLogs(String),
}

impl QueryKey {
    /// Session scope of a per-user key.
    pub fn scope(&self) -> Option<&str> {
        match self {
            QueryKey::Profile(s)
            | QueryKey::UserAnalytics(s)
            | QueryKey::Notifications(s)
            | QueryKey::Withdrawals(s)
            | QueryKey::AdminAnalytics(s)
            | QueryKey::ErrorLogs(s) => Some(s),
            QueryKey::Communities
            | QueryKey::Community(_)
            | QueryKey::Categories
            | QueryKey::Courses(_)
            | QueryKey::Course(_) => None,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Communities => write!(f, "communities"),
            QueryKey::Community(id) => write!(f, "community:{}", id),
            QueryKey::Categories => write!(f, "categories"),
            QueryKey::Courses(community) => write!(f, "courses:{}", community),
            QueryKey::Course(id) => write!(f, "course:{}", id),
            QueryKey::Profile(scope) => write!(f, "user:{}:profile", scope),
            QueryKey::UserAnalytics(scope) => write!(f, "user:{}:analytics", scope),
            QueryKey::Notifications(scope) => write!(f, "user:{}:notifications", scope),
            QueryKey::Withdrawals(scope) => write!(f, "user:{}:withdrawals", scope),
            QueryKey::AdminAnalytics(scope) => write!(f, "user:{}:admin-analytics", scope),
            QueryKey::ErrorLogs(scope) => write!(f, "user:{}:error-logs", scope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_stable() {
        assert_eq!(QueryKey::Communities.to_string(), "communities");
        assert_eq!(QueryKey::Course("k1".into()).to_string(), "course:k1");
        assert_eq!(
            QueryKey::Profile("abc".into()).to_string(),
            "user:abc:profile"
        );
    }

    #[test]
    fn test_scope() {
        assert_eq!(QueryKey::Withdrawals("s1".into()).scope(), Some("s1"));
        assert_eq!(QueryKey::Community("c1".into()).scope(), None);
    }
}
