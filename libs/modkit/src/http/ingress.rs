use std::time::Duration;

use anyhow::{bail, Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{middleware::from_fn, Router};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use super::request_id;

/// `modules.api_ingress` configuration section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// The single browser origin allowed to call the API with credentials.
    pub client_url: String,
    pub cors_enabled: bool,
    pub body_limit_bytes: usize,
    pub request_timeout_secs: u64,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            client_url: "http://localhost:3000".to_string(),
            cors_enabled: true,
            body_limit_bytes: 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

fn cors_layer(client_url: &str) -> Result<CorsLayer> {
    let origin = client_url.trim().trim_end_matches('/');
    if origin == "*" {
        bail!("client_url must name a single origin when credentials are allowed");
    }
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("invalid client_url: {client_url}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Wrap the assembled router with the global middleware stack.
///
/// Outermost to innermost:
/// SetRequestId -> PropagateRequestId -> CORS -> Trace -> push_req_id_to_extensions -> Timeout -> BodyLimit
pub fn apply_ingress_layers(mut router: Router, cfg: &ApiIngressConfig) -> Result<Router> {
    let x_request_id = request_id::header();

    router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
    router = router.layer(TimeoutLayer::new(Duration::from_secs(cfg.request_timeout_secs)));
    router = router.layer(from_fn(request_id::push_req_id_to_extensions));
    router = router.layer(request_id::create_trace_layer());

    if cfg.cors_enabled {
        router = router.layer(cors_layer(&cfg.client_url)?);
    }

    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

    Ok(router)
}
