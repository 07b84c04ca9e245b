pub mod admin;
pub mod categories;
pub mod communities;
pub mod courses;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod reports;
pub mod routes;
pub mod session;
pub mod withdrawals;

pub use routes::create_router;
