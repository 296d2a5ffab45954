// Cross-cutting prompt fragments shared by every structured-output call.
// Feature modules keep their own prompts.rs next to the code that uses them.

/// Appended to every system prompt that expects a JSON reply.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Joins a role description with the JSON-only contract.
pub fn json_system_prompt(role: &str) -> String {
    format!("{} {}", role.trim_end(), JSON_ONLY_SYSTEM)
}
