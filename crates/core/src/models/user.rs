use serde::{Deserialize, Serialize};

use crate::progress::WatchedSet;
use crate::roles::Role;

/// Watched lessons of the user in one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course_id: String,
    #[serde(default)]
    pub watched: WatchedSet,
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    /// Joined community ids.
    #[serde(default)]
    pub communities: Vec<String>,
    #[serde(default)]
    pub progress: Vec<CourseProgress>,
    /// Withdrawable creator earnings.
    #[serde(default)]
    pub balance: f64,
}

impl User {
    pub fn watched_set(&self, course_id: &str) -> Option<&WatchedSet> {
        self.progress
            .iter()
            .find(|p| p.course_id == course_id)
            .map(|p| &p.watched)
    }

    /// Record a watched lesson locally. Returns false if already present.
    pub fn record_watched(&mut self, course_id: &str, index: usize) -> bool {
        match self.progress.iter_mut().find(|p| p.course_id == course_id) {
            Some(entry) => entry.watched.insert(index),
            None => {
                let mut watched = WatchedSet::new();
                watched.insert(index);
                self.progress.push(CourseProgress {
                    course_id: course_id.to_string(),
                    watched,
                });
                true
            }
        }
    }

    pub fn has_joined(&self, community_id: &str) -> bool {
        self.communities.iter().any(|c| c == community_id)
    }
}

/// Profile fields a user may change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
}
