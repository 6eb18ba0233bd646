//! Interview question generation for a resume/job pair.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::prompts::{
    fill_resume_job_template, INTERVIEW_QUESTIONS_PROMPT_TEMPLATE, INTERVIEW_QUESTIONS_SYSTEM,
};
use crate::analysis::schema::{bucket_list, require_object, SchemaViolation};
use crate::gateway::{Analysis, AnalysisRequest};
use crate::llm_client::prompts::JSON_ONLY_REMINDER;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBuckets {
    pub technical: Vec<String>,
    pub behavioral: Vec<String>,
    pub situational: Vec<String>,
    pub role_specific: Vec<String>,
}

impl QuestionBuckets {
    pub fn total(&self) -> usize {
        self.technical.len()
            + self.behavioral.len()
            + self.situational.len()
            + self.role_specific.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewQuestionSet {
    pub questions: QuestionBuckets,
}

impl Analysis for InterviewQuestionSet {
    const KIND: &'static str = "interview-questions";

    fn system_prompt() -> &'static str {
        INTERVIEW_QUESTIONS_SYSTEM
    }

    fn build_prompt(request: &AnalysisRequest) -> String {
        let prompt = fill_resume_job_template(
            INTERVIEW_QUESTIONS_PROMPT_TEMPLATE,
            request.profile_document.trim(),
            request.target_description.trim(),
        );
        format!("{prompt}\n\n{JSON_ONLY_REMINDER}")
    }

    /// `questions` must be an object holding at least one question overall.
    /// Individual categories default to empty.
    fn validate(payload: &Value) -> Result<Self, SchemaViolation> {
        let obj = require_object(payload)?;

        let buckets = match obj.get("questions") {
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(SchemaViolation("'questions' must be an object".to_string()));
            }
            None => {
                return Err(SchemaViolation(
                    "missing required field 'questions'".to_string(),
                ));
            }
        };

        let questions = QuestionBuckets {
            technical: bucket_list(Some(buckets), "technical"),
            behavioral: bucket_list(Some(buckets), "behavioral"),
            situational: bucket_list(Some(buckets), "situational"),
            role_specific: bucket_list(Some(buckets), "roleSpecific"),
        };

        if questions.total() == 0 {
            return Err(SchemaViolation(
                "'questions' contains no questions".to_string(),
            ));
        }

        Ok(InterviewQuestionSet { questions })
    }
}
