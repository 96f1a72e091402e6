//! Middleware: request extractors shared by handlers.

pub mod auth;

pub use auth::CurrentUser;
