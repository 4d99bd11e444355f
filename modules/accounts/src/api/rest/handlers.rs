use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{debug, error, info};
use uuid::Uuid;

use modkit::api::problem::{internal_error, ProblemResponse};
use modkit::JsonBody;

use crate::api::rest::cookies::SessionCookies;
use crate::api::rest::dto::{LoginReq, MessageDto, RegisterReq, UpdateProfileReq, UserDto};
use crate::api::rest::error::map_domain_error;
use crate::auth::CurrentUser;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

type SetCookie = [(HeaderName, HeaderValue); 1];

/// Internal failures at `error!`; rejected requests at `debug!`.
fn log_failure(action: &str, e: &DomainError) {
    if e.is_internal() {
        error!("Failed to {}: {}", action, e);
    } else {
        debug!("Rejected {}: {}", action, e);
    }
}

/// Sign a session for `user_id` and render it as a `Set-Cookie` header.
fn session_cookie(
    svc: &Service,
    cookies: &SessionCookies,
    user_id: Uuid,
    instance: &str,
) -> Result<SetCookie, ProblemResponse> {
    let token = svc
        .issue_session(user_id)
        .map_err(|e| map_domain_error(&e, instance))?;
    let value = cookies.issue(&token).map_err(|e| {
        error!("Failed to render session cookie: {}", e);
        internal_error("An internal error occurred").at(instance)
    })?;
    Ok([(header::SET_COOKIE, value)])
}

/// Register a new account and start its session
pub async fn register(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Extension(cookies): Extension<SessionCookies>,
    JsonBody(req_body): JsonBody<RegisterReq>,
) -> Result<(StatusCode, SetCookie, Json<UserDto>), ProblemResponse> {
    info!("Registering user: {}", req_body.redacted());

    match svc.register(req_body.into()).await {
        Ok(user) => {
            let cookie = session_cookie(&svc, &cookies, user.id, uri.path())?;
            Ok((StatusCode::CREATED, cookie, Json(UserDto::from(user))))
        }
        Err(e) => {
            log_failure("register user", &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Authenticate with email + password
pub async fn login(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Extension(cookies): Extension<SessionCookies>,
    JsonBody(req_body): JsonBody<LoginReq>,
) -> Result<(SetCookie, Json<UserDto>), ProblemResponse> {
    info!("Login attempt for {:?}", req_body.email);

    let email = req_body.email.unwrap_or_default();
    let password = req_body.password.unwrap_or_default();

    match svc.login(&email, &password).await {
        Ok(user) => {
            let cookie = session_cookie(&svc, &cookies, user.id, uri.path())?;
            Ok((cookie, Json(UserDto::from(user))))
        }
        Err(e) => {
            log_failure("login", &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Clear the session cookie
pub async fn logout(
    uri: Uri,
    Extension(cookies): Extension<SessionCookies>,
) -> Result<(SetCookie, Json<MessageDto>), ProblemResponse> {
    let value = cookies.clear().map_err(|e| {
        error!("Failed to render session cookie: {}", e);
        internal_error("An internal error occurred").at(uri.path())
    })?;
    Ok((
        [(header::SET_COOKIE, value)],
        Json(MessageDto {
            message: "Logged out".to_string(),
        }),
    ))
}

/// Current user's profile; counts as daily activity
pub async fn get_profile(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Getting profile for {}", current.id);

    match svc.profile(current.id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            log_failure(&format!("get profile {}", current.id), &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Partial profile update; refreshes the session cookie
pub async fn update_profile(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Extension(cookies): Extension<SessionCookies>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    JsonBody(req_body): JsonBody<UpdateProfileReq>,
) -> Result<(SetCookie, Json<UserDto>), ProblemResponse> {
    info!("Updating profile for {}", current.id);

    match svc.update_profile(current.id, req_body.into()).await {
        Ok(user) => {
            let cookie = session_cookie(&svc, &cookies, user.id, uri.path())?;
            Ok((cookie, Json(UserDto::from(user))))
        }
        Err(e) => {
            log_failure(&format!("update profile {}", current.id), &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
