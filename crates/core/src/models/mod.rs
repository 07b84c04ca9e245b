//! Records served by the platform API.
//!
//! Field names follow the API's camelCase JSON; ids may arrive as `_id`.

mod admin;
mod community;
mod course;
mod user;

pub use admin::*;
pub use community::*;
pub use course::*;
pub use user::*;

use serde::{Deserialize, Serialize};

/// Plain acknowledgement returned by mutating endpoints that do not echo
/// the resource back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
