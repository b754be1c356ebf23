//! Simulation fallback: deterministic stand-ins for every AI operation.
//!
//! Used when the engine has no LLM client, when simulation is forced, or when
//! a live call fails. Output shapes are identical to the live paths so callers
//! never branch on which one ran.
//!
//! Match scores come from a `StdRng` seeded by the job id and profile summary,
//! so the same inputs always produce the same scores.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::matching::models::{
    sort_by_score, EducationRecord, JobRecord, LanguageProficiency, MatchResult, Preferences,
    StructuredProfile, TextOrList,
};

pub const SIM_SCORE_MIN: u8 = 30;
pub const SIM_SCORE_BASE_MAX: u8 = 95;
pub const SIM_SCORE_MAX: u8 = 100;
const PYTHON_BOOST: u8 = 5;
const LOCATION_BOOST: u8 = 3;
const SNIPPET_CHARS: usize = 50;
const RESUME_EXCERPT_CHARS: usize = 500;

pub fn simulate_profile(
    cv_text: &str,
    preferences_text: &str,
    error: Option<&str>,
) -> StructuredProfile {
    info!(
        "Executing simulated profile extraction. CV: {:?}..., preferences: {:?}...",
        snippet(cv_text, SNIPPET_CHARS),
        snippet(preferences_text, SNIPPET_CHARS)
    );

    let summary = match error {
        Some(message) => format!("Simulated summary based on CV and preferences. {message}"),
        None => "Simulated summary based on CV and preferences.".to_string(),
    };

    StructuredProfile {
        summary,
        key_skills: ["Python", "Django", "JavaScript", "Simulated Skill"]
            .map(String::from)
            .to_vec(),
        experience_level: "Mid-Level (Simulated)".to_string(),
        german_language_proficiency: "B1 (Simulated)".to_string(),
        other_languages: vec![LanguageProficiency {
            language: "English".to_string(),
            proficiency: "Fluent (Simulated)".to_string(),
        }],
        preferences: Preferences {
            desired_roles: vec![
                "Software Developer".to_string(),
                "Backend Engineer (Simulated)".to_string(),
            ],
            location_preferences: vec!["Berlin (Simulated)".to_string(), "Remote".to_string()],
            work_model: TextOrList::Text("Hybrid (Simulated)".to_string()),
            salary_expectations_eur_k_pa: "65-75k EUR per annum (Simulated)".to_string(),
            company_culture_preferences: TextOrList::Text("Collaborative (Simulated)".to_string()),
        },
        education: vec![EducationRecord {
            degree: "Simulated Degree".to_string(),
            field: "Simulated Field".to_string(),
            institution: "Simulated University".to_string(),
            graduation_year: "2020".to_string(),
        }],
        extracted_cv_highlights: "Simulated highlight 1.\nSimulated highlight 2.".to_string(),
        error_during_api_call: error.map(String::from),
        extra: Default::default(),
    }
}

/// Scores each job with a seeded base score plus keyword boosts.
///
/// Base score is in `30..=95`; "Python" in the profile skills together with
/// "python" in the job title adds 5, a job location listed in the profile's
/// location preferences adds 3. Capped at 100.
pub fn simulate_matches(
    profile: &StructuredProfile,
    jobs: &[JobRecord],
    error: Option<&str>,
) -> Vec<MatchResult> {
    info!(
        "Executing simulated job matching for {} jobs. Profile summary: {:?}...",
        jobs.len(),
        snippet(&profile.summary, SNIPPET_CHARS)
    );

    let location_preferences = &profile.preferences.location_preferences;

    let mut results: Vec<MatchResult> = jobs
        .iter()
        .enumerate()
        .map(|(index, job)| {
            let mut rng = StdRng::seed_from_u64(seed_for(job, profile));
            let mut score: u8 = rng.gen_range(SIM_SCORE_MIN..=SIM_SCORE_BASE_MAX);

            let mut reason = vec!["Simulated Reason:".to_string()];
            let mut insights = vec!["Simulated Insights:".to_string()];
            let mut tips = vec!["Simulated Tips:".to_string()];

            if profile.has_skill("Python") && job.title.to_lowercase().contains("python") {
                score = score.saturating_add(PYTHON_BOOST).min(SIM_SCORE_MAX);
                reason.push("Good Python skill alignment.".to_string());
                tips.push("Highlight Python projects.".to_string());
            }

            if let Some(location) = job.location.as_deref().filter(|l| !l.trim().is_empty()) {
                if !location_preferences.is_empty() {
                    if location_preferences.iter().any(|p| p == location) {
                        score = score.saturating_add(LOCATION_BOOST).min(SIM_SCORE_MAX);
                        insights.push(format!("Location {location} matches preference."));
                    } else {
                        insights.push(format!(
                            "Location {location} does not match preference {}.",
                            location_preferences.join(", ")
                        ));
                    }
                }
            }

            if reason.len() == 1 {
                reason.push("General simulated match.".to_string());
            }
            if insights.len() == 1 {
                insights.push("Standard insights apply.".to_string());
            }
            if tips.len() == 1 {
                tips.push("Standard application advice.".to_string());
            }
            if let (0, Some(message)) = (index, error) {
                reason.push(format!("(SimError: {message})"));
            }

            MatchResult {
                job: job.clone(),
                score,
                reason: reason.join(" "),
                insights: insights.join(" "),
                tips: tips.join(" "),
            }
        })
        .collect();

    sort_by_score(&mut results);
    results
}

pub fn simulate_cover_letter(skills_text: &str, job: &JobRecord, error: Option<&str>) -> String {
    info!("Executing simulated cover letter generation for job: {}", job.title);
    let mut text = format!(
        "(Simulated Cover Letter for {} at {}) Based on your skills in {}..., \
         this job seems like a good fit because... (simulated reason).",
        job.title,
        job.company,
        snippet(skills_text, SNIPPET_CHARS)
    );
    append_error(&mut text, error);
    text
}

pub fn simulate_custom_resume(cv_text: &str, job: &JobRecord, error: Option<&str>) -> String {
    info!("Executing simulated custom resume generation for job: {}", job.title);
    let mut text = format!(
        "(Simulated Custom Resume for {} at {})\n{}...\n[Resume optimized for target job. Simulated output.]",
        job.title,
        job.company,
        snippet(cv_text, RESUME_EXCERPT_CHARS)
    );
    append_error(&mut text, error);
    text
}

fn append_error(text: &mut String, error: Option<&str>) {
    if let Some(message) = error {
        text.push_str(&format!(" (SimError: {message})"));
    }
}

fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// FNV-1a over the job id and profile summary. Stable across runs and builds.
fn seed_for(job: &JobRecord, profile: &StructuredProfile) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    job.id
        .bytes()
        .chain(std::iter::once(0))
        .chain(profile.summary.bytes())
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}
