// All LLM prompt templates for the matching module.
// Placeholders are `{name}` and are filled with `str::replace` before sending.

/// Profile extraction prompt. Replace `{cv_text}` and `{preferences_text}`.
pub const PROFILE_PROMPT_TEMPLATE: &str = r#"You are an expert HR and career consultant. Analyze the candidate's CV and stated preferences below and extract the key information as a single, valid JSON object.

CANDIDATE CV / RESUME:
---
{cv_text}
---

CANDIDATE PREFERENCES:
---
{preferences_text}
---

Return a JSON object with this EXACT schema:
{
  "summary": "A concise 2-3 sentence professional summary of the candidate.",
  "key_skills": ["skill", "technology", "methodology"],
  "experience_level": "One of: Entry-Level, Junior, Mid-Level, Senior, Lead, Principal, Manager, Director, Executive.",
  "german_language_proficiency": "Estimate from CV and preferences, e.g. A1, B2, C1, Native, Not Mentioned.",
  "other_languages": [
    {"language": "English", "proficiency": "Native, Fluent, C1, ..."}
  ],
  "preferences": {
    "desired_roles": ["role type", "job title"],
    "location_preferences": ["city", "Remote", "Germany-wide"],
    "work_model": ["Remote", "Hybrid", "On-site"],
    "salary_expectations_eur_k_pa": "e.g. 60-70k EUR per annum, or Not Mentioned.",
    "company_culture_preferences": ["fast-paced", "collaborative", "work-life balance"]
  },
  "education": [
    {"degree": "Master of Science", "field": "Computer Science", "institution": "University name", "graduation_year": "YYYY"}
  ],
  "extracted_cv_highlights": "A few bullet points of key achievements or experiences from the CV."
}

Rules:
- Output ONLY the JSON object, starting with '{' and ending with '}'. No text before or after it.
- If some information is not available, use "Not Mentioned" or an empty array as appropriate for the field type."#;

/// Batch job matching prompt. Replace `{profile_json}` and `{jobs_json}`.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"You are an expert job matching analyst for the German market. You will receive a structured candidate profile and a list of job listings. Evaluate every job against the profile.

STRUCTURED CANDIDATE PROFILE:
```json
{profile_json}
```

JOB LISTINGS (JSON array):
```json
{jobs_json}
```

Return a single JSON ARRAY with exactly one object per input job:
[
  {
    "id": "the exact id of the job from the input list",
    "match_score": 85,
    "match_reason": "2-3 sentences on the main factors behind the score: key alignments and mismatches.",
    "job_insights": "* Pro: Role type matches the preferred 'Backend Engineer' role. * Con: Location 'Munich' differs from preference 'Berlin'.",
    "application_tips": "* Emphasize your Python and Django experience. * Mention your B2 German, it is valuable even for English-language roles."
  }
]

SCORING RULES:
1. `match_score` is an integer from 0 to 100 for overall suitability.
2. Weigh skills, experience level, preferences (role, location, work model, salary if mentioned), language skills (German especially) and education.
3. `job_insights` holds 2-3 bullet points, `application_tips` holds 1-2 bullet points, each as a single string.
4. Be critical and realistic. Cultural fit, if inferable, is a bonus.
5. Output ONLY the JSON array, starting with '[' and ending with ']'."#;

/// Cover letter opening prompt.
/// Replace: {skills_text}, {job_title}, {company}, {level}, {description}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Based on the candidate's skills and the job details below, write a concise and compelling opening paragraph for a cover letter (1-2 sentences maximum).

Candidate skills: {skills_text}
Job title: {job_title}
Company: {company}
Level: {level}
Description: {description}

Cover letter opening paragraph:"#;

/// Tailored resume prompt.
/// Replace: {cv_text}, {job_title}, {company}, {level}, {description}
pub const CUSTOM_RESUME_PROMPT_TEMPLATE: &str = r#"You are an expert career consultant and resume writer. Optimize the candidate's resume for the target job below, keeping the original structure and formatting as much as possible while improving expression, clarity and relevance.

CANDIDATE RESUME (original):
---
{cv_text}
---

TARGET JOB:
---
Job title: {job_title}
Company: {company}
Level: {level}
Description: {description}
---

HARD RULES:
1. Keep the sections, their order and the bullet structure of the original.
2. Rewrite each section with more impactful, role-relevant language.
3. Do NOT invent experience or skills that are not in the original.
4. Output ONLY the improved resume text, with no explanation or commentary."#;

/// Fills `{name}` placeholders in one pass. Inserted values are never
/// scanned again, so user text containing a placeholder stays literal.
/// Braces that do not start a known placeholder are copied through.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_carry_their_placeholders() {
        for placeholder in ["{cv_text}", "{preferences_text}"] {
            assert!(PROFILE_PROMPT_TEMPLATE.contains(placeholder));
        }
        for placeholder in ["{profile_json}", "{jobs_json}"] {
            assert!(MATCH_PROMPT_TEMPLATE.contains(placeholder));
        }
        for placeholder in ["{skills_text}", "{job_title}", "{company}", "{level}", "{description}"] {
            assert!(COVER_LETTER_PROMPT_TEMPLATE.contains(placeholder));
        }
        for placeholder in ["{cv_text}", "{job_title}", "{company}", "{level}", "{description}"] {
            assert!(CUSTOM_RESUME_PROMPT_TEMPLATE.contains(placeholder));
        }
    }

    #[test]
    fn test_match_prompt_names_the_response_keys() {
        for key in ["match_score", "match_reason", "job_insights", "application_tips"] {
            assert!(MATCH_PROMPT_TEMPLATE.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_fill_template_does_not_rescan_inserted_text() {
        let filled = fill_template(
            "CV: {cv_text}\nPrefs: {preferences_text}",
            &[
                ("{cv_text}", "Rust engineer"),
                ("{preferences_text}", "Berlin, see {cv_text}"),
            ],
        );
        assert_eq!(filled, "CV: Rust engineer\nPrefs: Berlin, see {cv_text}");
    }

    #[test]
    fn test_fill_template_keeps_json_braces_and_unknown_keys() {
        let filled = fill_template(
            r#"{"id": 1} {unknown} {x}{x}"#,
            &[("{x}", "ab")],
        );
        assert_eq!(filled, r#"{"id": 1} {unknown} abab"#);
    }
}
