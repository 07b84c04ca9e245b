//! Testing utilities: a mock platform API and record fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use agora_core::testing::{fixtures, MockPlatformApi};
//!
//! let api = Arc::new(MockPlatformApi::new());
//! api.set_communities(fixtures::communities(45)).await;
//! api.add_session("token", fixtures::user("u1", Role::User)).await;
//!
//! let client = PlatformClient::new(api.clone(), Arc::new(QueryCache::new()));
//! ```

mod mock_platform_api;

pub use mock_platform_api::{MockPlatformApi, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::models::{Category, Community, Course, Fee, Lesson, LessonContent, User};
    use crate::roles::Role;

    const CATEGORIES: [&str; 4] = ["Tech", "Art", "Music", "Games"];

    /// A free community with no description and no members.
    pub fn community(id: &str, name: &str, category: &str) -> Community {
        Community {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            category: category.to_string(),
            fee: Fee::Free,
            members: Vec::new(),
            creator: None,
            created_at: None,
        }
    }

    /// `n` communities `c0..c{n-1}` cycling through four categories.
    pub fn communities(n: usize) -> Vec<Community> {
        (0..n)
            .map(|i| {
                community(
                    &format!("c{}", i),
                    &format!("Community {}", i),
                    CATEGORIES[i % CATEGORIES.len()],
                )
            })
            .collect()
    }

    pub fn categories(names: &[&str]) -> Vec<Category> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Category {
                id: format!("cat-{}", i),
                name: name.to_string(),
            })
            .collect()
    }

    /// Course of community `c0` with `lessons` hosted-video lessons.
    pub fn course(id: &str, lessons: usize) -> Course {
        Course {
            id: id.to_string(),
            community: Some("c0".to_string()),
            name: format!("Course {}", id),
            description: String::new(),
            duration_weeks: 4,
            lessons: (0..lessons)
                .map(|i| Lesson {
                    title: format!("Lesson {}", i + 1),
                    summary: None,
                    content: LessonContent::Video {
                        url: format!("https://cdn.example.com/{}/{}.mp4", id, i),
                    },
                })
                .collect(),
            videos: Vec::new(),
        }
    }

    /// User with no memberships, no progress and zero balance.
    pub fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: format!("User {}", id),
            email: format!("{}@example.com", id),
            role,
            communities: Vec::new(),
            progress: Vec::new(),
            balance: 0.0,
        }
    }
}
