//! # ModKit
//!
//! Small module toolkit shared by the LearnPath modules.
//!
//! - **Contracts**: `Module` / `DbModule` / `RestfulModule` phases
//! - **Context**: per-module config access, DB handle and a typed `ClientHub`
//! - **Registry**: explicit, dependency-checked module ordering
//! - **HTTP**: RFC 9457 problems, request-id + trace layers, ingress middleware

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod contracts;
pub use contracts::{DbModule, Module, RestfulModule};

pub mod context;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};

pub mod client_hub;
pub use client_hub::ClientHub;

pub mod registry;
pub use registry::{ModuleRegistry, RegistryBuilder, RegistryError};

pub mod api;
pub use api::JsonBody;
pub use api::problem::{
    bad_request, internal_error, not_found, unauthorized, Problem, ProblemResponse,
};

pub mod http;
pub mod runtime;
pub mod web;
