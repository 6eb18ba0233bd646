//! Axum route handlers for the Analysis API.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;

use crate::analysis::ats::AnalysisResult;
use crate::analysis::interview::InterviewQuestionSet;
use crate::config::RateLimitIdentity;
use crate::errors::AppError;
use crate::gateway::AnalysisRequest;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Body shared by both analysis endpoints. Missing fields deserialize as empty
/// and are rejected by the gateway as invalid input.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeJobRequest {
    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub job_description: String,
}

impl From<ResumeJobRequest> for AnalysisRequest {
    fn from(body: ResumeJobRequest) -> Self {
        AnalysisRequest::new(body.resume, body.job_description)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis/resume
///
/// Scores a resume against a job description and returns keyword coverage
/// plus per-section suggestions.
pub async fn handle_resume_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ResumeJobRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let identity = resolve_identity(&headers, &state.config.identity);
    let result = state
        .gateway
        .run::<AnalysisResult>(&identity, state.config.analyze_rate_limit, &body.into())
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/analysis/interview-questions
///
/// Generates categorized interview questions for the resume/job pair.
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ResumeJobRequest>,
) -> Result<Json<InterviewQuestionSet>, AppError> {
    let identity = resolve_identity(&headers, &state.config.identity);
    let result = state
        .gateway
        .run::<InterviewQuestionSet>(&identity, state.config.questions_rate_limit, &body.into())
        .await?;
    Ok(Json(result))
}

/// Picks the rate limiter identity for a request.
fn resolve_identity(headers: &HeaderMap, policy: &RateLimitIdentity) -> String {
    policy
        .header
        .as_deref()
        .and_then(|name| headers.get(name))
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
        .unwrap_or_else(|| policy.fixed.clone())
}
