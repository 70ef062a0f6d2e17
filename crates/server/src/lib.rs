//! HTTP front-end for dedupit.
//!
//! One POST endpoint plus a liveness probe:
//!
//! - `POST /dedupe`: a JSON array of `{"id", "data"}` records in,
//!   `{"groups": [...]}` out. Bodies over 100 KiB and batches over 100
//!   records are rejected with `413` before any model work; every other
//!   failure is a `500` with the error message in the body.
//! - `GET /health`: liveness JSON.
//!
//! All deduplication logic lives behind [`dedupit::dedupe_records`];
//! this crate only parses, enforces the size limits, and maps errors to
//! status codes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use dedupit::{dedupe_records, DedupeConfig, DedupeError, Record};
use dedupit_core::limits;

/// Build the service router.
pub fn router(config: Arc<DedupeConfig>) -> Router {
    Router::new()
        .route("/dedupe", post(dedupe))
        .route("/health", get(health))
        // Backstop at the extractor level; the handler re-checks so the
        // limit is enforced even for callers that bypass the layer
        .layer(DefaultBodyLimit::max(limits::MAX_REQUEST_BODY_BYTES))
        .with_state(config)
}

async fn dedupe(State(config): State<Arc<DedupeConfig>>, body: Bytes) -> Response {
    if let Err(err) = limits::check_body_size(body.len()) {
        return (StatusCode::PAYLOAD_TOO_LARGE, err.to_string()).into_response();
    }

    let records: Vec<Record> = match serde_json::from_slice(&body) {
        Ok(records) => records,
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("invalid request body: {}", err),
            )
                .into_response();
        }
    };

    if let Err(err) = limits::check_record_count(records.len()) {
        return (StatusCode::PAYLOAD_TOO_LARGE, err.to_string()).into_response();
    }

    match dedupe_records(records, &config).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => {
            tracing::error!(target: "dedupit::server", error = %err, "dedupe request failed");
            (error_status(&err), err.to_string()).into_response()
        }
    }
}

fn error_status(err: &DedupeError) -> StatusCode {
    if err.is_size_limit() {
        StatusCode::PAYLOAD_TOO_LARGE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        router(Arc::new(DedupeConfig::default()))
    }

    fn post_dedupe(payload: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/dedupe")
            .header("content-type", "application/json")
            .body(Body::from(payload))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_batch_returns_empty_groups() {
        let response = test_router().oneshot(post_dedupe("[]".into())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"groups": []}));
    }

    #[tokio::test]
    async fn test_too_many_records_rejected_with_413() {
        let records: Vec<serde_json::Value> = (0..101)
            .map(|i| serde_json::json!({"id": format!("r{i}"), "data": {}}))
            .collect();
        let payload = serde_json::to_string(&records).unwrap();

        let response = test_router().oneshot(post_dedupe(payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let message = String::from_utf8(body.to_vec()).unwrap();
        assert!(message.contains("101"));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected_with_413() {
        // One huge record under the count limit but over the byte limit
        let filler = "x".repeat(limits::MAX_REQUEST_BODY_BYTES);
        let payload = format!(r#"[{{"id": "a", "data": {{"blob": "{filler}"}}}}]"#);

        let response = test_router().oneshot(post_dedupe(payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_malformed_json_is_500() {
        let response = test_router()
            .oneshot(post_dedupe("this is not json".into()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_exactly_100_records_passes_the_limit_check() {
        // 100 empty-data records: the batch passes validation and the
        // pipeline short-circuits nothing, but with identical empty
        // projections the embedder is the first collaborator touched.
        // The default config points at a local endpoint that is not
        // running in tests, so anything except 413 proves the limit
        // check let the batch through.
        let records: Vec<serde_json::Value> = (0..100)
            .map(|i| serde_json::json!({"id": format!("r{i}"), "data": {}}))
            .collect();
        let payload = serde_json::to_string(&records).unwrap();

        let response = test_router().oneshot(post_dedupe(payload)).await.unwrap();
        assert_ne!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
