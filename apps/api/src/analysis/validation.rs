//! Shape validation for model output.
//!
//! The inference reply is untrusted input. Parsing enforces field presence
//! and the priority enum; this pass enforces what serde cannot: the score
//! range and non-empty text. Blank `suggestedText` values are normalized to
//! absent rather than rejected.

use crate::analysis::models::{AnalysisResult, Insight};

pub const MAX_MATCH_PERCENTAGE: u8 = 100;

/// Returns the normalized result, or every violation found.
pub fn validate_analysis(mut result: AnalysisResult) -> Result<AnalysisResult, Vec<String>> {
    let mut problems = Vec::new();

    if result.match_percentage > MAX_MATCH_PERCENTAGE {
        problems.push(format!(
            "matchPercentage {} is outside 0-100",
            result.match_percentage
        ));
    }

    for (i, item) in result.missing_skills.iter_mut().enumerate() {
        let at = format!("missingSkills[{i}]");
        require_text(&mut problems, &at, "skill", &item.skill);
        require_text(&mut problems, &at, "explanation", &item.explanation);
        require_text(&mut problems, &at, "recommendation", &item.recommendation);
        normalize_optional(&mut item.suggested_text);
    }
    check_insights(&mut problems, "experienceReframing", &mut result.experience_reframing);
    check_insights(&mut problems, "strengths", &mut result.strengths);

    if let Some(sections) = &result.suggested_sections {
        for (i, section) in sections.iter().enumerate() {
            let at = format!("suggestedSections[{i}]");
            require_text(&mut problems, &at, "title", &section.title);
            require_text(&mut problems, &at, "content", &section.content);
        }
    }

    if problems.is_empty() {
        Ok(result)
    } else {
        Err(problems)
    }
}

fn check_insights(problems: &mut Vec<String>, list: &str, items: &mut [Insight]) {
    for (i, item) in items.iter_mut().enumerate() {
        let at = format!("{list}[{i}]");
        require_text(problems, &at, "title", &item.title);
        require_text(problems, &at, "explanation", &item.explanation);
        require_text(problems, &at, "recommendation", &item.recommendation);
        normalize_optional(&mut item.suggested_text);
    }
}

fn require_text(problems: &mut Vec<String>, at: &str, field: &str, value: &str) {
    if value.trim().is_empty() {
        problems.push(format!("{at}.{field} is empty"));
    }
}

fn normalize_optional(value: &mut Option<String>) {
    if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *value = None;
    }
}
