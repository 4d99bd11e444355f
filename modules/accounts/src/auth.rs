//! Session authentication for routes of any module.
//!
//! The accounts module publishes a [`SessionGuard`] to the `ClientHub`; other
//! modules fetch it during `init` and wrap their protected routes with
//! [`SessionGuard::protect`]. Handlers behind the guard receive the caller as
//! `Extension<CurrentUser>`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    Router,
};
use tracing::debug;

use modkit::api::problem::{internal_error, unauthorized};

use crate::api::rest::cookies::token_from_headers;
use crate::contract::{client::AccountsApi, error::AccountsError, model::User};

/// The authenticated caller, inserted into request extensions by the guard.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolves the request's session (cookie first, then `Authorization: Bearer`).
#[derive(Clone)]
pub struct SessionGuard {
    api: Arc<dyn AccountsApi>,
    cookie_name: Arc<str>,
}

impl SessionGuard {
    pub fn new(api: Arc<dyn AccountsApi>, cookie_name: impl Into<String>) -> Self {
        Self {
            api,
            cookie_name: Arc::from(cookie_name.into()),
        }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<User, AccountsError> {
        let token = token_from_headers(headers, &self.cookie_name);
        self.api.resolve_session(token.as_deref()).await
    }

    /// Require a valid session on every route of `router`.
    pub fn protect(&self, router: Router) -> Router {
        router.route_layer(from_fn_with_state(self.clone(), require_session))
    }
}

pub async fn require_session(
    State(guard): State<SessionGuard>,
    mut req: Request,
    next: Next,
) -> Response {
    match guard.authenticate(req.headers()).await {
        Ok(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        Err(e) => {
            debug!(path = %req.uri().path(), error = %e, "Rejected unauthenticated request");
            let instance = req.uri().path().to_string();
            let problem = match e {
                AccountsError::Unauthorized { message } => unauthorized(message),
                AccountsError::Internal => internal_error("An internal error occurred"),
                _ => unauthorized("Not authorized, token failed"),
            };
            problem
                .with_code("ACCOUNTS_NOT_AUTHORIZED")
                .at(instance)
                .into_response()
        }
    }
}
