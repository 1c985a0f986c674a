// All LLM prompt constants for the classifier. Templates use {placeholder}
// markers filled by `build_prompt` before sending.

/// System instruction for job evaluation — enforces JSON-only output.
pub const EVALUATION_SYSTEM: &str =
    "You are a meticulous recruiter assistant that evaluates job offers \
    against a candidate profile. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Evaluation prompt template. Replace `{title}`, `{company}`, `{location}`,
/// `{description}`, `{skills}`, `{experience}` and `{preferences}` before
/// sending.
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"Evaluate this job offer against my profile.

JOB DETAILS:
Title: {title}
Company: {company}
Location: {location}
Description: {description}

MY PROFILE:
Skills: {skills}
Experience: {experience}
Preferences: {preferences}

Analyze the job description and determine how well it matches my skills,
experience, and preferences. Consider technical requirements, experience
level, and work arrangements (remote/on-site).

Return a JSON object with this EXACT schema (no extra fields):
{
  "is_relevant": true,
  "score": 82,
  "reason": "Brief explanation why this job is or isn't a good match",
  "summary": "Summary of the key points of this job and why it's a good match (if relevant)",
  "skills_match": ["list", "of", "matching", "skills"],
  "missing_skills": ["list", "of", "required", "skills", "the", "candidate", "lacks"]
}

Rules:
- "is_relevant" is a boolean, not a string.
- "score" is an integer from 0 to 100.
- Ensure the response parses as valid JSON.
"#;
