pub mod api;
pub mod cache;
pub mod classroom;
pub mod client;
pub mod config;
pub mod listing;
pub mod metrics;
pub mod models;
pub mod progress;
pub mod roles;
pub mod search;
pub mod testing;
pub mod validation;
pub mod view;

pub use api::{ApiError, Credentials, HttpPlatformApi, PlatformApi};
pub use cache::{QueryCache, QueryKey};
pub use classroom::{display_to_lesson, lesson_to_display, Classroom, ClassroomError, ContentType};
pub use client::PlatformClient;
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use listing::{community_listing, paginate, Page, PageState, DEFAULT_PAGE_SIZE};
pub use progress::{course_progress, MarkOutcome, ProgressError, ProgressTracker, WatchedSet};
pub use roles::{Access, Capability, Role, RouteGuard};
pub use search::{CommunitySearch, SearchIndex, SearchOptions};
pub use validation::{SubmitError, ValidationErrors};
pub use view::{Notice, ViewState};
