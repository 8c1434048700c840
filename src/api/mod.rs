//! API module for all HTTP handlers

pub mod handlers;

// Re-export handlers
pub use handlers::{deploy_succeeded, root};
