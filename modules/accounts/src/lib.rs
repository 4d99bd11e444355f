// === PUBLIC CONTRACT ===
// Only the contract module should be public for other modules to consume
pub mod contract;

// Re-export the public contract components
pub use contract::{client, error, model};

// Session guard shared with modules that protect their own routes
pub mod auth;

// === MODULE DEFINITION ===
pub mod module;
pub use module::Accounts;

// === INTERNAL MODULES ===
// Exposed for tests; other modules should go through `contract` and `auth`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
