use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::rest::{cookies::SessionCookies, handlers};
use crate::auth::SessionGuard;
use crate::domain::service::Service;

pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    cookies: SessionCookies,
    guard: SessionGuard,
) -> anyhow::Result<Router> {
    // POST /api/users - Register
    // POST /api/users/login - Login
    // POST /api/users/logout - Clear the session cookie
    let public = Router::new()
        .route("/api/users", post(handlers::register))
        .route("/api/users/login", post(handlers::login))
        .route("/api/users/logout", post(handlers::logout));

    // GET|PUT /api/users/profile - Own profile, session required
    let protected = guard.protect(Router::new().route(
        "/api/users/profile",
        get(handlers::get_profile).put(handlers::update_profile),
    ));

    let users = public
        .merge(protected)
        .layer(Extension(service))
        .layer(Extension(cookies));

    Ok(router.merge(users))
}
