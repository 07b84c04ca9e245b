use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription fee of a community. The API sends a plain number where 0
/// means free.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "f64", into = "f64")]
pub enum Fee {
    #[default]
    Free,
    Paid(f64),
}

impl Fee {
    pub fn amount(&self) -> f64 {
        match self {
            Fee::Free => 0.0,
            Fee::Paid(amount) => *amount,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Fee::Free)
    }
}

impl From<f64> for Fee {
    fn from(amount: f64) -> Self {
        if amount > 0.0 {
            Fee::Paid(amount)
        } else {
            Fee::Free
        }
    }
}

impl From<Fee> for f64 {
    fn from(fee: Fee) -> Self {
        fee.amount()
    }
}

/// A topic-scoped group with membership and courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Category name; must be one of the current categories to match a filter.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub fee: Fee,
    /// Member user ids.
    #[serde(default)]
    pub members: Vec<String>,
    /// User id of the creator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Community {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.creator.as_deref() == Some(user_id)
    }
}

/// Body for creating a community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommunity {
    pub name: String,
    pub description: String,
    pub category: String,
    pub fee: f64,
}

/// Body for editing a community; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
}

/// Externally managed taxonomy tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_community_from_api() {
        let json = r#"{
            "_id": "c1",
            "name": "Abstract Algebra Club",
            "description": "Groups, rings, fields",
            "category": "Math",
            "fee": 0,
            "members": ["u1", "u2"],
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let community: Community = serde_json::from_str(json).unwrap();
        assert_eq!(community.id, "c1");
        assert!(community.fee.is_free());
        assert_eq!(community.member_count(), 2);
        assert!(community.is_member("u2"));
        assert!(community.created_at.is_some());
    }

    #[test]
    fn test_paid_fee() {
        let community: Community =
            serde_json::from_str(r#"{"id":"c2","name":"Pro","fee":19.5}"#).unwrap();
        assert_eq!(community.fee, Fee::Paid(19.5));
        assert_eq!(community.fee.amount(), 19.5);
        assert_eq!(community.description, "");
    }

    #[test]
    fn test_fee_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Fee::Free).unwrap(), "0.0");
        assert_eq!(serde_json::to_string(&Fee::Paid(5.0)).unwrap(), "5.0");
    }
}
