use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};

use super::problem::{Problem, ProblemResponse};

/// `Json<T>` whose rejections are rendered as problem responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_owned();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "rejected JSON body");
                Err(
                    ProblemResponse::from(Problem::for_status(rejection.status(), rejection.body_text()))
                        .at(path)
                        .with_code("INVALID_BODY"),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::post, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Payload {
        name: String,
    }

    fn app() -> Router {
        Router::new().route(
            "/items",
            post(|JsonBody(p): JsonBody<Payload>| async move { p.name }),
        )
    }

    #[tokio::test]
    async fn valid_body_is_extracted() {
        let resp = app()
            .oneshot(
                axum::http::Request::post("/items")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"rust"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_body_is_a_problem() {
        let resp = app()
            .oneshot(
                axum::http::Request::post("/items")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/problem+json"
        );
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["instance"], "/items");
        assert_eq!(v["code"], "INVALID_BODY");
    }

    #[tokio::test]
    async fn missing_content_type_is_415() {
        let resp = app()
            .oneshot(
                axum::http::Request::post("/items")
                    .body(Body::from(r#"{"name":"rust"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
