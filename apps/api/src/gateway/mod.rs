//! Analysis Gateway — the only path from a caller to the external model.
//!
//! Per call: validate input → rate limit → cache lookup → model → sanitize →
//! validate → cache store → return. Any step may end the call with a typed
//! `GatewayError`. Nothing is retried here and failures are never cached.
//!
//! The limiter and cache are shared stores with their own locks. Neither is
//! held while the model call is in flight.

pub mod cache;
pub mod rate_limiter;
pub mod sanitizer;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::schema::SchemaViolation;
use crate::llm_client::{LlmError, TextModel};
use cache::ResultCache;
use rate_limiter::{RateDecision, RateLimiter};
use sanitizer::{parse_payload, MalformedResponse};

/// Default upper bound on a single model call.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("rate limit exceeded; retry after {}s", .retry_after.as_secs())]
    RateLimitExceeded { retry_after: Duration },

    #[error("upstream model unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error(transparent)]
    MalformedResponse(#[from] MalformedResponse),

    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),
}

/// The input pair every analysis takes.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub profile_document: String,
    pub target_description: String,
}

impl AnalysisRequest {
    pub fn new(profile_document: impl Into<String>, target_description: impl Into<String>) -> Self {
        Self {
            profile_document: profile_document.into(),
            target_description: target_description.into(),
        }
    }

    fn ensure_complete(&self) -> Result<(), GatewayError> {
        if self.profile_document.trim().is_empty() {
            return Err(GatewayError::InvalidInput(
                "profile document cannot be empty".to_string(),
            ));
        }
        if self.target_description.trim().is_empty() {
            return Err(GatewayError::InvalidInput(
                "target description cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// One kind of model-backed analysis. Implemented by the validated output type.
pub trait Analysis: Serialize + DeserializeOwned + Send {
    /// Stable name, part of the cache fingerprint.
    const KIND: &'static str;

    fn system_prompt() -> &'static str;

    fn build_prompt(request: &AnalysisRequest) -> String;

    /// Checks the parsed payload and produces the normalized result.
    fn validate(payload: &Value) -> Result<Self, SchemaViolation>;
}

/// Deterministic, order-sensitive cache key for `(kind, profile, target)`.
/// Not collision resistant; only meant to keep distinct requests apart.
pub fn fingerprint(kind: &str, request: &AnalysisRequest) -> String {
    let profile = request.profile_document.trim();
    let target = request.target_description.trim();

    let mut hasher = DefaultHasher::new();
    kind.hash(&mut hasher);
    profile.hash(&mut hasher);
    target.hash(&mut hasher);

    format!(
        "{kind}:{}:{}:{:016x}",
        profile.len(),
        target.len(),
        hasher.finish()
    )
}

#[derive(Debug, Clone, Copy)]
pub struct GatewaySettings {
    pub cache_ttl: Duration,
    pub model_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            cache_ttl: cache::DEFAULT_TTL,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }
}

pub struct AnalysisGateway {
    model: Arc<dyn TextModel>,
    limiter: Arc<RateLimiter>,
    cache: Arc<ResultCache>,
    settings: GatewaySettings,
}

impl AnalysisGateway {
    pub fn new(
        model: Arc<dyn TextModel>,
        limiter: Arc<RateLimiter>,
        cache: Arc<ResultCache>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            model,
            limiter,
            cache,
            settings,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Runs one analysis for `identity`, admitting at most `limit` calls per window.
    pub async fn run<A: Analysis>(
        &self,
        identity: &str,
        limit: u32,
        request: &AnalysisRequest,
    ) -> Result<A, GatewayError> {
        let request_id = Uuid::new_v4();

        request.ensure_complete()?;

        if let RateDecision::Reject { retry_after } = self.limiter.check(identity, limit) {
            warn!(
                "[{request_id}] {} rejected for identity '{identity}': limit {limit} reached",
                A::KIND
            );
            return Err(GatewayError::RateLimitExceeded { retry_after });
        }

        let key = fingerprint(A::KIND, request);
        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_str::<A>(&cached) {
                Ok(result) => {
                    debug!("[{request_id}] cache hit for {key}");
                    return Ok(result);
                }
                Err(e) => warn!("[{request_id}] discarding undecodable cache entry {key}: {e}"),
            }
        } else {
            debug!("[{request_id}] cache miss for {key}");
        }

        let prompt = A::build_prompt(request);
        info!("[{request_id}] invoking model for {}", A::KIND);

        let raw = tokio::time::timeout(
            self.settings.model_timeout,
            self.model.complete(&prompt, A::system_prompt()),
        )
        .await
        .map_err(|_| {
            warn!(
                "[{request_id}] model call timed out after {}s",
                self.settings.model_timeout.as_secs()
            );
            GatewayError::UpstreamUnavailable("model call timed out".to_string())
        })?
        .map_err(|e| classify_model_error(request_id, e))?;

        let payload = parse_payload(&raw).inspect_err(|e| {
            warn!("[{request_id}] {e}");
        })?;

        let result = A::validate(&payload).inspect_err(|e| {
            warn!("[{request_id}] {} {e}", A::KIND);
        })?;

        match serde_json::to_string(&result) {
            Ok(serialized) => self.cache.set(&key, serialized, self.settings.cache_ttl),
            Err(e) => warn!("[{request_id}] result not cached, serialization failed: {e}"),
        }

        info!("[{request_id}] {} completed", A::KIND);
        Ok(result)
    }
}

fn classify_model_error(request_id: Uuid, err: LlmError) -> GatewayError {
    warn!("[{request_id}] model call failed: {err}");
    match err {
        LlmError::EmptyContent => {
            GatewayError::MalformedResponse(MalformedResponse("model returned no text".to_string()))
        }
        other => GatewayError::UpstreamUnavailable(other.to_string()),
    }
}
