pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    let max_request_bytes = state.config.max_request_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/analysis/resume",
            post(handlers::handle_resume_analysis),
        )
        .route(
            "/api/v1/analysis/interview-questions",
            post(handlers::handle_interview_questions),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{Config, RateLimitIdentity};
    use crate::gateway::cache::ResultCache;
    use crate::gateway::rate_limiter::{RateLimiter, RateLimiterConfig};
    use crate::gateway::{AnalysisGateway, GatewaySettings};
    use crate::llm_client::{LlmError, TextModel};

    struct CannedModel {
        reply: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextModel for CannedModel {
        async fn complete(&self, _prompt: &str, system: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if system.contains("recruiter") {
                return Ok(r#"{"questions": {"technical": ["Explain Send vs Sync."]}}"#.to_string());
            }
            Ok(self.reply.clone())
        }
    }

    fn test_config() -> Config {
        Config {
            anthropic_api_key: "test-key".to_string(),
            anthropic_api_url: "http://127.0.0.1:1/v1/messages".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            rate_limit_interval: Duration::from_secs(60),
            rate_limit_max_identities: 100,
            analyze_rate_limit: 2,
            questions_rate_limit: 5,
            identity: RateLimitIdentity {
                header: Some("x-client-id".to_string()),
                fixed: "global".to_string(),
            },
            cache_max_entries: 100,
            cache_ttl: Duration::from_secs(300),
            model_timeout: Duration::from_secs(5),
            sweep_interval: Duration::from_secs(60),
            max_request_bytes: 64 * 1024,
        }
    }

    fn app(reply: &str) -> (Router, Arc<CannedModel>) {
        let config = test_config();
        let model = Arc::new(CannedModel {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        });
        let gateway = AnalysisGateway::new(
            model.clone(),
            Arc::new(RateLimiter::new(RateLimiterConfig {
                interval: config.rate_limit_interval,
                max_tracked_identities: config.rate_limit_max_identities,
            })),
            Arc::new(ResultCache::new(config.cache_max_entries)),
            GatewaySettings {
                cache_ttl: config.cache_ttl,
                model_timeout: config.model_timeout,
            },
        );
        let state = AppState {
            gateway: Arc::new(gateway),
            config,
        };
        (build_router(state), model)
    }

    fn post_json(uri: &str, client: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-client-id", client)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const GOOD_REPLY: &str =
        r#"{"score": 66, "presentKeywords": ["Rust"], "missingKeywords": ["AWS"], "suggestions": {}}"#;

    fn analysis_body() -> Value {
        json!({"resume": "Rust developer", "jobDescription": "Rust + AWS role"})
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let (app, _) = app(GOOD_REPLY);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_resume_analysis_returns_validated_result() {
        let (app, _) = app(GOOD_REPLY);
        let response = app
            .oneshot(post_json("/api/v1/analysis/resume", "alice", analysis_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["score"], 66);
        assert_eq!(body["missingKeywords"], json!(["AWS"]));
        assert_eq!(body["suggestions"]["education"], json!([]));
    }

    #[tokio::test]
    async fn test_empty_field_is_bad_request() {
        let (app, model) = app(GOOD_REPLY);
        let response = app
            .oneshot(post_json(
                "/api/v1/analysis/resume",
                "alice",
                json!({"resume": "", "jobDescription": "role"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_client_header() {
        let (app, model) = app(GOOD_REPLY);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(post_json("/api/v1/analysis/resume", "alice", analysis_body()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let limited = app
            .clone()
            .oneshot(post_json("/api/v1/analysis/resume", "alice", analysis_body()))
            .await
            .unwrap();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(limited.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(body_json(limited).await["error"]["code"], "RATE_LIMITED");

        let other = app
            .oneshot(post_json("/api/v1/analysis/resume", "bob", analysis_body()))
            .await
            .unwrap();
        assert_eq!(other.status(), StatusCode::OK);

        // alice's second call and bob's call were cache hits
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_schema_violation_is_bad_gateway() {
        let (app, _) = app(r#"{"score": 250, "presentKeywords": [], "missingKeywords": []}"#);
        let response = app
            .oneshot(post_json("/api/v1/analysis/resume", "alice", analysis_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"]["code"], "SCHEMA_VIOLATION");
    }

    #[tokio::test]
    async fn test_malformed_reply_is_bad_gateway() {
        let (app, _) = app("Sorry, something went wrong.");
        let response = app
            .oneshot(post_json("/api/v1/analysis/resume", "alice", analysis_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"]["code"], "MALFORMED_RESPONSE");
    }

    #[tokio::test]
    async fn test_interview_questions_endpoint() {
        let (app, _) = app(GOOD_REPLY);
        let response = app
            .oneshot(post_json(
                "/api/v1/analysis/interview-questions",
                "alice",
                analysis_body(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["questions"]["technical"], json!(["Explain Send vs Sync."]));
        assert_eq!(body["questions"]["roleSpecific"], json!([]));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected_before_model() {
        let (app, model) = app(GOOD_REPLY);
        // test_config caps bodies at 64 KiB
        let body = json!({"resume": "x".repeat(100 * 1024), "jobDescription": "role"});
        let response = app
            .oneshot(post_json("/api/v1/analysis/resume", "alice", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (app, _) = app(GOOD_REPLY);
        let response = app
            .oneshot(Request::get("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }
}
