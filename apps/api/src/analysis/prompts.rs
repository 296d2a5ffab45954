// Prompt constants for resume/job-description analysis.

/// Role half of the system prompt; the JSON-only contract is appended by
/// `llm_client::prompts::json_system_prompt`.
pub const ANALYSIS_ROLE: &str = "You are an expert resume analyst with deep knowledge of HR \
    and recruitment. You provide detailed, actionable feedback on how to optimize resumes \
    for specific job descriptions.";

/// Low temperature: repeatable scores matter more than creative phrasing.
pub const ANALYSIS_TEMPERATURE: f32 = 0.2;

/// Analysis prompt template. Replace `{resume_text}` and `{job_description}`.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the resume against the job description provided and generate detailed, actionable feedback.

Focus on:
1. Calculate a match percentage based on skills and keyword alignment (integer 0-100)
2. Identify missing skills or keywords that are critical to the job, each with a priority of "high", "medium" or "low"
3. Suggest how existing experience can be reframed to better match the job requirements
4. Highlight strengths already present in the resume
5. For each item above, provide specific text the applicant can copy directly into their resume
6. Create 1-3 complete suggested sections (e.g. Technical Skills, Professional Summary) that can be copied into the resume

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

Return a JSON object with this EXACT schema (no extra fields):
{
  "matchPercentage": 65,
  "missingSkills": [
    {
      "skill": "Kubernetes",
      "priority": "high",
      "explanation": "Why this skill matters for the role",
      "recommendation": "What to add or change",
      "suggestedText": "Text that can be added to the resume as-is"
    }
  ],
  "experienceReframing": [
    {
      "title": "Short label for the experience",
      "explanation": "Why the current framing undersells it",
      "recommendation": "How to reframe it",
      "suggestedText": "A rewritten bullet point"
    }
  ],
  "strengths": [
    {
      "title": "Short label for the strength",
      "explanation": "Why it matches the job",
      "recommendation": "How to highlight it further",
      "suggestedText": "Text that better highlights this strength"
    }
  ],
  "suggestedSections": [
    {
      "title": "Technical Skills",
      "content": "Complete ready-to-use text for this section"
    }
  ]
}

RULES:
- "explanation" and "recommendation" must never be empty
- "priority" must be exactly one of "high", "medium", "low"
- Include "suggestedText" for every item: professional, concise, ready to paste
- Be specific: point out exactly what should be added, modified, or emphasized"#;

/// Fills the template. Substitution is single-pass so placeholder-like text
/// inside the resume is never expanded a second time.
pub fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    let (head, rest) = ANALYSIS_PROMPT_TEMPLATE
        .split_once("{resume_text}")
        .unwrap_or((ANALYSIS_PROMPT_TEMPLATE, ""));
    let (middle, tail) = rest.split_once("{job_description}").unwrap_or((rest, ""));

    let mut prompt = String::with_capacity(
        ANALYSIS_PROMPT_TEMPLATE.len() + resume_text.len() + job_description.len(),
    );
    prompt.push_str(head);
    prompt.push_str(resume_text.trim());
    prompt.push_str(middle);
    prompt.push_str(job_description.trim());
    prompt.push_str(tail);
    prompt
}
