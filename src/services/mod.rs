// Services module
// Request-independent operations behind the HTTP dispatchers

pub mod empathy;
pub mod messages;
pub mod timeline;
pub mod users;
