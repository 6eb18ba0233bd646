// LLM prompt constants for the analysis endpoints.
// Each template embeds both inputs and the exact JSON shape the validator expects.

/// System prompt for resume/job match analysis.
pub const RESUME_ANALYSIS_SYSTEM: &str =
    "You are an expert applicant tracking system (ATS) analyst and resume reviewer. \
    Compare a resume against a job description. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Resume analysis prompt. Replace `{resume}` and `{job_description}` before sending.
pub const RESUME_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze how well the resume below matches the job description.

Return a JSON object with this EXACT schema:
{
  "score": 72,
  "presentKeywords": ["Rust", "distributed systems"],
  "missingKeywords": ["Kubernetes"],
  "suggestions": {
    "skills": ["Add Kubernetes if you have used it in production"],
    "experience": ["Quantify the latency improvement in your current role"],
    "education": [],
    "projects": ["Link the open-source cache project"]
  }
}

Rules:
- "score" is an INTEGER from 0 to 100 measuring overall fit.
- "presentKeywords" lists important job-description terms that appear in the resume.
- "missingKeywords" lists important job-description terms absent from the resume.
- Every suggestion bucket ("skills", "experience", "education", "projects") MUST be present;
  use an empty list when there is nothing to suggest.
- Suggestions must be concrete and grounded in the resume. Do NOT invent experience.

RESUME:
{resume}

JOB DESCRIPTION:
{job_description}"#;

/// System prompt for interview question generation.
pub const INTERVIEW_QUESTIONS_SYSTEM: &str =
    "You are an experienced technical recruiter and hiring manager. \
    Prepare interview questions tailored to a candidate and a role. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Interview question prompt. Replace `{resume}` and `{job_description}` before sending.
pub const INTERVIEW_QUESTIONS_PROMPT_TEMPLATE: &str = r#"Generate interview questions this candidate is likely to face for the role below.

Return a JSON object with this EXACT schema:
{
  "questions": {
    "technical": ["How would you design a rate limiter for a multi-tenant API?"],
    "behavioral": ["Tell me about a time you disagreed with a design decision."],
    "situational": ["What would you do if a release broke production on a Friday?"],
    "roleSpecific": ["How have you used Rust's ownership model to avoid data races?"]
  }
}

Rules:
- Every category ("technical", "behavioral", "situational", "roleSpecific") MUST be present.
- Ask 2 to 5 questions per category.
- Ground questions in the resume's actual experience and the job's stated requirements.

RESUME:
{resume}

JOB DESCRIPTION:
{job_description}"#;

/// Substitutes `{resume}` and `{job_description}` in one pass over `template`.
/// Inserted text is never rescanned, so placeholders typed by the user stay literal.
pub fn fill_resume_job_template(template: &str, resume: &str, job_description: &str) -> String {
    const MARKERS: [&str; 2] = ["{resume}", "{job_description}"];
    let values = [resume, job_description];

    let mut out = String::with_capacity(template.len() + resume.len() + job_description.len());
    let mut rest = template;

    loop {
        let next = MARKERS
            .iter()
            .zip(values)
            .filter_map(|(marker, value)| rest.find(marker).map(|at| (at, *marker, value)))
            .min_by_key(|(at, _, _)| *at);

        let Some((at, marker, value)) = next else {
            out.push_str(rest);
            return out;
        };

        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + marker.len()..];
    }
}
