//! Shared REST API types.

pub mod json;
pub mod problem;

pub use json::JsonBody;
