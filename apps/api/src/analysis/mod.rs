//! Analysis Requester: compares resume text with a job description through
//! the structured-output provider and returns a validated `AnalysisResult`.
//! All inference goes through `llm_client`.

pub mod models;
pub mod prompts;
pub mod validation;

use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_ROLE, ANALYSIS_TEMPERATURE};
use crate::analysis::validation::validate_analysis;
use crate::llm_client::prompts::json_system_prompt;
use crate::llm_client::{strip_json_fences, CompletionProvider, CompletionRequest, LlmError};

pub use models::{AnalysisResult, Insight, Priority};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("analysis service is not configured: {0}")]
    Configuration(String),

    #[error("inference call failed: {0}")]
    Upstream(String),

    #[error("could not parse analysis response: {0}")]
    Parse(String),
}

impl From<LlmError> for AnalysisError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey => AnalysisError::Configuration(e.to_string()),
            LlmError::EmptyContent => AnalysisError::Parse(e.to_string()),
            LlmError::Http(_) | LlmError::Api { .. } => AnalysisError::Upstream(e.to_string()),
        }
    }
}

/// Runs one analysis. Inputs are checked before anything leaves the process;
/// the reply is parsed and shape-validated as a whole, so callers never see a
/// partially populated result.
pub async fn analyze(
    provider: &dyn CompletionProvider,
    resume_text: &str,
    job_description: &str,
) -> Result<AnalysisResult, AnalysisError> {
    if resume_text.trim().is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Resume text is empty; no readable text was found in the uploaded file".to_string(),
        ));
    }
    if job_description.trim().is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Job description is required".to_string(),
        ));
    }

    let system = json_system_prompt(ANALYSIS_ROLE);
    let prompt = build_analysis_prompt(resume_text, job_description);
    let request = CompletionRequest {
        system: &system,
        prompt: &prompt,
        temperature: ANALYSIS_TEMPERATURE,
    };

    let reply = provider.complete_json(&request).await?;
    let result = parse_analysis(&reply)?;

    info!(
        match_percentage = result.match_percentage,
        missing_skills = result.missing_skills.len(),
        strengths = result.strengths.len(),
        "Analysis completed"
    );
    Ok(result)
}

/// Parses and validates a raw model reply.
pub fn parse_analysis(reply: &str) -> Result<AnalysisResult, AnalysisError> {
    let parsed: AnalysisResult = serde_json::from_str(strip_json_fences(reply))
        .map_err(|e| AnalysisError::Parse(e.to_string()))?;

    validate_analysis(parsed).map_err(|problems| {
        warn!(?problems, "Model reply failed shape validation");
        AnalysisError::Parse(problems.join("; "))
    })
}
