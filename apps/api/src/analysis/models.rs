use serde::{Deserialize, Serialize};

/// Structured feedback comparing one resume with one job description.
/// Wire names are camelCase to match the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub match_percentage: u8,
    pub missing_skills: Vec<MissingSkill>,
    pub experience_reframing: Vec<Insight>,
    pub strengths: Vec<Insight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_sections: Option<Vec<SuggestedSection>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingSkill {
    pub skill: String,
    pub priority: Priority,
    pub explanation: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_text: Option<String>,
}

/// Shared shape of `experienceReframing` and `strengths` items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub title: String,
    pub explanation: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedSection {
    pub title: String,
    pub content: String,
}

impl AnalysisResult {
    pub fn sections(&self) -> &[SuggestedSection] {
        self.suggested_sections.as_deref().unwrap_or_default()
    }
}
