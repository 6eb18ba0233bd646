//! Resume/job match analysis (ATS-style score, keywords, suggestions).
//!
//! Validation is strict on `score` and the keyword lists, which callers
//! treat as structure, and lenient on suggestion buckets, which are advice:
//! a missing or mistyped bucket becomes an empty list instead of an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::prompts::{
    fill_resume_job_template, RESUME_ANALYSIS_PROMPT_TEMPLATE, RESUME_ANALYSIS_SYSTEM,
};
use crate::analysis::schema::{
    bucket_list, require_int_in_range, require_object, require_string_list, SchemaViolation,
};
use crate::gateway::{Analysis, AnalysisRequest};
use crate::llm_client::prompts::JSON_ONLY_REMINDER;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

/// Suggestion buckets. Always present in a validated result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 0 – 100
    pub score: u8,
    pub present_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub suggestions: Suggestions,
}

impl Analysis for AnalysisResult {
    const KIND: &'static str = "resume-analysis";

    fn system_prompt() -> &'static str {
        RESUME_ANALYSIS_SYSTEM
    }

    fn build_prompt(request: &AnalysisRequest) -> String {
        let prompt = fill_resume_job_template(
            RESUME_ANALYSIS_PROMPT_TEMPLATE,
            request.profile_document.trim(),
            request.target_description.trim(),
        );
        format!("{prompt}\n\n{JSON_ONLY_REMINDER}")
    }

    fn validate(payload: &Value) -> Result<Self, SchemaViolation> {
        let obj = require_object(payload)?;

        let score = require_int_in_range(obj, "score", MIN_SCORE, MAX_SCORE)?;
        let present_keywords = require_string_list(obj, "presentKeywords")?;
        let missing_keywords = require_string_list(obj, "missingKeywords")?;

        let buckets = obj.get("suggestions").and_then(Value::as_object);
        let suggestions = Suggestions {
            skills: bucket_list(buckets, "skills"),
            experience: bucket_list(buckets, "experience"),
            education: bucket_list(buckets, "education"),
            projects: bucket_list(buckets, "projects"),
        };

        Ok(AnalysisResult {
            // In range [0, 100] after the check above
            score: score as u8,
            present_keywords,
            missing_keywords,
            suggestions,
        })
    }
}
