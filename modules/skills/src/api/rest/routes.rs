use axum::{routing::get, Extension, Router};
use std::sync::Arc;

use accounts::auth::SessionGuard;

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    guard: SessionGuard,
) -> anyhow::Result<Router> {
    // GET /api/skills - List all skills
    // GET /api/skills/{id} - Get a specific skill
    let public = Router::new()
        .route("/api/skills", get(handlers::list_skills))
        .route("/api/skills/{id}", get(handlers::get_skill));

    // POST /api/skills - Create a skill
    // PUT /api/skills/{id} - Update a skill
    // DELETE /api/skills/{id} - Delete a skill
    let protected = guard.protect(
        Router::new()
            .route("/api/skills", axum::routing::post(handlers::create_skill))
            .route(
                "/api/skills/{id}",
                axum::routing::put(handlers::update_skill).delete(handlers::delete_skill),
            ),
    );

    let skills = public.merge(protected).layer(Extension(service));
    Ok(router.merge(skills))
}
