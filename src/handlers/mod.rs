//! HTTP handlers outside the account surface.

pub mod http;

pub use http::{health, AppJson, AppState};
