// Library root for the ene gratitude card API

pub mod config;
pub mod db;
pub mod enrich;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use db::Database;
pub use error::{ApiError, ApiResult};
pub use models::{Envelope, MessageRow, MessageView, TimelineEntry, User};
pub use store::{EneStore, SharedStore};
