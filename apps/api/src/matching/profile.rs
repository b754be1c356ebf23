//! Profile Extractor. Turns free-text CV + preferences into a `StructuredProfile`.

use tracing::error;

use crate::llm_client::json_extract::extract_json_object;
use crate::llm_client::TextGenerator;
use crate::matching::engine::{generate_text, AiEngine, AiError};
use crate::matching::models::StructuredProfile;
use crate::matching::prompts::{fill_template, PROFILE_PROMPT_TEMPLATE};
use crate::matching::simulation::simulate_profile;

const TASK: &str = "user profile extraction";

/// Extracts a structured profile. Never fails: any error yields the
/// simulated profile with `error_during_api_call` set.
pub async fn extract_user_profile(
    engine: &AiEngine,
    cv_text: &str,
    preferences_text: &str,
) -> StructuredProfile {
    let Some(generator) = engine.generator(TASK) else {
        return simulate_profile(cv_text, preferences_text, None);
    };

    match try_extract_user_profile(generator, cv_text, preferences_text).await {
        Ok(profile) => profile,
        Err(e) => {
            error!("Gemini {TASK} failed: {e}");
            simulate_profile(cv_text, preferences_text, Some(&e.to_string()))
        }
    }
}

pub async fn try_extract_user_profile(
    generator: &dyn TextGenerator,
    cv_text: &str,
    preferences_text: &str,
) -> Result<StructuredProfile, AiError> {
    let prompt = build_profile_prompt(cv_text, preferences_text);
    let text = generate_text(generator, TASK, &prompt).await?;

    let object = extract_json_object(TASK, &text).map_err(|e| {
        error!(
            "Could not parse JSON for {}: {e}. Raw response was: {}",
            e.task(),
            e.raw()
        );
        e
    })?;

    serde_json::from_value(serde_json::Value::Object(object)).map_err(AiError::Schema)
}

fn build_profile_prompt(cv_text: &str, preferences_text: &str) -> String {
    fill_template(
        PROFILE_PROMPT_TEMPLATE,
        &[
            ("{cv_text}", cv_text),
            ("{preferences_text}", preferences_text),
        ],
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::matching::engine::testing::FakeGenerator;
    use crate::matching::engine::SimulationReason;
    use crate::matching::models::NOT_MENTIONED;

    const REQUIRED_KEYS: [&str; 8] = [
        "summary",
        "key_skills",
        "experience_level",
        "german_language_proficiency",
        "other_languages",
        "preferences",
        "education",
        "extracted_cv_highlights",
    ];

    const PROFILE_REPLY: &str = r#"Here is the profile:
```json
{
  "summary": "Backend engineer with 5 years of Python.",
  "key_skills": ["Python", "Django", "PostgreSQL"],
  "experience_level": "Senior",
  "german_language_proficiency": "B2",
  "other_languages": [{"language": "English", "proficiency": "C2"}],
  "preferences": {
    "desired_roles": ["Backend Engineer"],
    "location_preferences": ["Berlin", "Remote"],
    "work_model": ["Hybrid"],
    "salary_expectations_eur_k_pa": "70-80k",
    "company_culture_preferences": []
  },
  "education": [],
  "extracted_cv_highlights": "* Led migration to Django 4"
}
```"#;

    fn assert_has_required_keys(profile: &StructuredProfile) {
        let value = serde_json::to_value(profile).unwrap();
        for key in REQUIRED_KEYS {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }

    #[tokio::test]
    async fn test_empty_inputs_simulated_yield_all_keys() {
        let engine = AiEngine::simulated(SimulationReason::Forced);
        let profile = extract_user_profile(&engine, "", "").await;
        assert_has_required_keys(&profile);
        assert!(profile.error_during_api_call.is_none());
    }

    #[tokio::test]
    async fn test_live_reply_is_parsed() {
        let fake = Arc::new(FakeGenerator::text(PROFILE_REPLY));
        let engine = AiEngine::new(fake.clone());

        let profile = extract_user_profile(&engine, "My CV", "Berlin please").await;
        assert_eq!(profile.experience_level, "Senior");
        assert_eq!(profile.key_skills, vec!["Python", "Django", "PostgreSQL"]);
        assert_eq!(profile.preferences.location_preferences, vec!["Berlin", "Remote"]);
        assert!(profile.error_during_api_call.is_none());

        let prompt = fake.last_prompt().unwrap();
        assert!(prompt.contains("My CV"));
        assert!(prompt.contains("Berlin please"));
    }

    #[tokio::test]
    async fn test_sparse_reply_gets_placeholders() {
        let engine = AiEngine::new(Arc::new(FakeGenerator::text("{\"summary\": \"Short.\"}")));
        let profile = extract_user_profile(&engine, "", "").await;
        assert_eq!(profile.summary, "Short.");
        assert_eq!(profile.experience_level, NOT_MENTIONED);
        assert_has_required_keys(&profile);
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back_with_error() {
        let engine = AiEngine::new(Arc::new(FakeGenerator::text("Sorry, I cannot help.")));
        let profile = extract_user_profile(&engine, "CV", "").await;
        let error = profile.error_during_api_call.as_deref().unwrap();
        assert!(error.starts_with("API JSON parsing error:"), "got {error}");
        assert_has_required_keys(&profile);
    }

    #[tokio::test]
    async fn test_upstream_failure_falls_back_with_error() {
        let engine = AiEngine::new(Arc::new(FakeGenerator::failing()));
        let profile = extract_user_profile(&engine, "CV", "").await;
        let error = profile.error_during_api_call.as_deref().unwrap();
        assert!(error.starts_with("API call/processing error:"), "got {error}");
    }

    #[tokio::test]
    async fn test_placeholder_list_fields_keep_live_profile() {
        let reply = r#"{
            "summary": "Frontend developer, 3 years React.",
            "key_skills": ["React", "TypeScript"],
            "other_languages": "Not Mentioned",
            "education": "Not Mentioned",
            "preferences": {"work_model": ["Remote", null]}
        }"#;
        let engine = AiEngine::new(Arc::new(FakeGenerator::text(reply)));

        let profile = extract_user_profile(&engine, "CV", "").await;
        assert!(profile.error_during_api_call.is_none());
        assert_eq!(profile.summary, "Frontend developer, 3 years React.");
        assert_eq!(profile.key_skills, vec!["React", "TypeScript"]);
        assert!(profile.other_languages.is_empty());
        assert!(profile.education.is_empty());
        assert_has_required_keys(&profile);
    }

    #[test]
    fn test_prompt_does_not_expand_placeholders_in_user_text() {
        let prompt = build_profile_prompt("My CV body", "Remote only {cv_text}");
        assert!(prompt.contains("Remote only {cv_text}"));
        assert_eq!(prompt.matches("My CV body").count(), 1);
    }
}
