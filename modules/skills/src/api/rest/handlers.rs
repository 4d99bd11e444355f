use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{debug, error, info};

use accounts::auth::CurrentUser;
use modkit::api::problem::ProblemResponse;
use modkit::JsonBody;

use crate::api::rest::dto::{CreateSkillReq, SkillDto, UpdateSkillReq};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::{NewSkill, SkillPatch};
use crate::domain::error::DomainError;
use crate::domain::service::{parse_skill_id, Service};

#[derive(Debug, Clone, serde::Serialize)]
pub struct MessageDto {
    pub message: String,
}

/// Internal failures at `error!`; rejected requests at `debug!`.
fn log_failure(action: &str, e: &DomainError) {
    if e.is_internal() {
        error!("Failed to {}: {}", action, e);
    } else {
        debug!("Rejected {}: {}", action, e);
    }
}

/// List all skills, newest first
pub async fn list_skills(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<SkillDto>>, ProblemResponse> {
    info!("Listing skills");

    match svc.list_skills().await {
        Ok(skills) => Ok(Json(skills.into_iter().map(SkillDto::from).collect())),
        Err(e) => {
            log_failure("list skills", &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific skill by ID
pub async fn get_skill(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<SkillDto>, ProblemResponse> {
    info!("Getting skill with id: {}", id);

    let result = match parse_skill_id(&id) {
        Ok(id) => svc.get_skill(id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(skill) => Ok(Json(SkillDto::from(skill))),
        Err(e) => {
            log_failure(&format!("get skill {id}"), &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a new skill owned by the caller
pub async fn create_skill(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    JsonBody(req_body): JsonBody<CreateSkillReq>,
) -> Result<(StatusCode, Json<SkillDto>), ProblemResponse> {
    info!("Creating skill {:?} for {}", req_body.name, caller.id);

    let result = match NewSkill::try_from(req_body) {
        Ok(new_skill) => svc.create_skill(new_skill, Some(caller.id)).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(skill) => Ok((StatusCode::CREATED, Json(SkillDto::from(skill)))),
        Err(e) => {
            log_failure("create skill", &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Update a skill with the whitelisted fields of the body
pub async fn update_skill(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(id): Path<String>,
    JsonBody(req_body): JsonBody<UpdateSkillReq>,
) -> Result<Json<SkillDto>, ProblemResponse> {
    info!("Updating skill {} by {}", id, caller.id);

    let result = match (parse_skill_id(&id), SkillPatch::try_from(req_body)) {
        (Ok(id), Ok(patch)) => svc.update_skill(id, patch).await,
        (Err(e), _) | (_, Err(e)) => Err(e),
    };
    match result {
        Ok(skill) => Ok(Json(SkillDto::from(skill))),
        Err(e) => {
            log_failure(&format!("update skill {id}"), &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a skill by ID
pub async fn delete_skill(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageDto>, ProblemResponse> {
    info!("Deleting skill {} by {}", id, caller.id);

    let result = match parse_skill_id(&id) {
        Ok(id) => svc.delete_skill(id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => Ok(Json(MessageDto {
            message: "Skill removed".to_string(),
        })),
        Err(e) => {
            log_failure(&format!("delete skill {id}"), &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
