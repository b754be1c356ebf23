//! Job Matcher: scores a batch of jobs against a structured profile with a
//! single LLM call.
//!
//! Flow: truncate → prompt (profile + job summaries) → one call → extract
//! JSON array → reconcile ids against the input → clamp scores → sort.
//! Any failure along the way yields the simulation over the same jobs.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::llm_client::json_extract::extract_json_array;
use crate::llm_client::TextGenerator;
use crate::matching::engine::{generate_text, AiEngine, AiError};
use crate::matching::models::{
    sort_by_score, value_to_text, JobRecord, MatchResult, StructuredProfile,
};
use crate::matching::prompts::{fill_template, MATCH_PROMPT_TEMPLATE};
use crate::matching::simulation::simulate_matches;

const TASK: &str = "job matching";
/// Descriptions longer than this are cut before going into the prompt.
pub const DESCRIPTION_PROMPT_CHARS: usize = 1500;
const MISSING_TEXT: &str = "N/A";

/// Job fields sent to the model.
#[derive(Debug, Serialize)]
struct JobSummary<'a> {
    id: &'a str,
    title: &'a str,
    company: &'a str,
    description: String,
    level: &'a str,
    location: &'a str,
    industry: &'a str,
}

impl<'a> From<&'a JobRecord> for JobSummary<'a> {
    fn from(job: &'a JobRecord) -> Self {
        Self {
            id: &job.id,
            title: &job.title,
            company: &job.company,
            description: job
                .description_or_empty()
                .chars()
                .take(DESCRIPTION_PROMPT_CHARS)
                .collect(),
            level: job.level_or_default(),
            location: job.location_or_default(),
            industry: job.industry_or_default(),
        }
    }
}

/// Matches jobs against a profile. Never fails and never returns a job that
/// was not in `jobs`.
///
/// `max_jobs` keeps only a prefix of the list; `Some(0)` is ignored.
pub async fn match_jobs(
    engine: &AiEngine,
    profile: &StructuredProfile,
    jobs: &[JobRecord],
    max_jobs: Option<usize>,
) -> Vec<MatchResult> {
    let jobs = truncate_jobs(jobs, max_jobs);

    if jobs.is_empty() {
        info!("No job listings to process for {TASK}");
        return Vec::new();
    }

    let Some(generator) = engine.generator(TASK) else {
        return simulate_matches(profile, jobs, None);
    };

    match try_match_jobs(generator, profile, jobs).await {
        Ok(results) => results,
        Err(e) => {
            error!("Gemini {TASK} failed: {e}");
            simulate_matches(profile, jobs, Some(&e.to_string()))
        }
    }
}

pub async fn try_match_jobs(
    generator: &dyn TextGenerator,
    profile: &StructuredProfile,
    jobs: &[JobRecord],
) -> Result<Vec<MatchResult>, AiError> {
    let prompt = build_match_prompt(profile, jobs)?;
    let text = generate_text(generator, TASK, &prompt).await?;

    let items = extract_json_array(TASK, &text).map_err(|e| {
        error!(
            "Could not parse JSON for {}: {e}. Raw response was: {}",
            e.task(),
            e.raw()
        );
        e
    })?;

    Ok(reconcile_matches(&items, jobs))
}

/// Keeps the first `max_jobs` jobs. Not a random sample.
pub fn truncate_jobs(jobs: &[JobRecord], max_jobs: Option<usize>) -> &[JobRecord] {
    match max_jobs {
        Some(0) => {
            warn!("Invalid max_jobs (0) for {TASK}. Processing all {} jobs.", jobs.len());
            jobs
        }
        Some(max) if max < jobs.len() => {
            info!("Processing only the top {max} of {} job listings for {TASK}", jobs.len());
            &jobs[..max]
        }
        _ => jobs,
    }
}

fn build_match_prompt(profile: &StructuredProfile, jobs: &[JobRecord]) -> Result<String, AiError> {
    let profile_json = serde_json::to_string_pretty(profile).map_err(AiError::Prompt)?;
    let summaries: Vec<JobSummary<'_>> = jobs.iter().map(JobSummary::from).collect();
    let jobs_json = serde_json::to_string_pretty(&summaries).map_err(AiError::Prompt)?;

    Ok(fill_template(
        MATCH_PROMPT_TEMPLATE,
        &[
            ("{profile_json}", profile_json.as_str()),
            ("{jobs_json}", jobs_json.as_str()),
        ],
    ))
}

/// Pairs each model item with its input job by string id. Items for unknown
/// or already-seen ids are dropped. Result is sorted by score, highest first.
pub(crate) fn reconcile_matches(items: &[Value], jobs: &[JobRecord]) -> Vec<MatchResult> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut results = Vec::with_capacity(jobs.len());

    for item in items {
        let id = item.get("id").and_then(value_to_text).unwrap_or_default();

        let Some(job) = jobs.iter().find(|job| job.id == id) else {
            warn!("Job ID {id:?} from {TASK} response not found in the input listings. Skipping.");
            continue;
        };

        if !seen.insert(job.id.as_str()) {
            warn!("Duplicate job ID {id:?} in {TASK} response. Keeping the first.");
            continue;
        }

        results.push(MatchResult {
            job: job.clone(),
            score: read_score(item.get("match_score")),
            reason: read_text(item, "match_reason"),
            insights: read_text(item, "job_insights"),
            tips: read_text(item, "application_tips"),
        });
    }

    if results.len() < jobs.len() {
        warn!(
            "{TASK} response covered {} of {} jobs",
            results.len(),
            jobs.len()
        );
    }

    sort_by_score(&mut results);
    results
}

/// Reads a score from a number or numeric string, rounds it and clamps it
/// to 0..=100. Anything else is 0.
fn read_score(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(score) if score.is_finite() => score.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

fn read_text(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(value_to_text)
        .unwrap_or_else(|| MISSING_TEXT.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::matching::engine::testing::FakeGenerator;
    use crate::matching::engine::SimulationReason;

    fn job(id: &str, title: &str) -> JobRecord {
        serde_json::from_value(json!({
            "id": id,
            "job_title": title,
            "company_name": "Acme GmbH",
            "description": "Build APIs.",
            "location": "Berlin",
        }))
        .unwrap()
    }

    fn jobs(n: usize) -> Vec<JobRecord> {
        (1..=n).map(|i| job(&i.to_string(), "Backend Engineer")).collect()
    }

    fn profile() -> StructuredProfile {
        StructuredProfile {
            summary: "Python backend engineer".to_string(),
            key_skills: vec!["Python".to_string()],
            ..StructuredProfile::default()
        }
    }

    fn key_set(result: &MatchResult) -> BTreeSet<String> {
        serde_json::to_value(result)
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect()
    }

    const BATCH_REPLY: &str = r#"```json
[
  {"id": "1", "match_score": 62, "match_reason": "Decent fit.", "job_insights": "* Pro: Berlin", "application_tips": "* Mention Django"},
  {"id": "2", "match_score": 91, "match_reason": "Great fit.", "job_insights": "* Pro: Python", "application_tips": "* Lead with Python"},
  {"id": "999", "match_score": 99, "match_reason": "Hallucinated job."},
  {"id": 3, "match_score": "75", "match_reason": "Good fit."}
]
```"#;

    #[tokio::test]
    async fn test_empty_jobs_returns_empty_without_calling_llm() {
        let fake = Arc::new(FakeGenerator::text("[]"));
        let engine = AiEngine::new(fake.clone());

        let results = match_jobs(&engine, &profile(), &[], Some(10)).await;
        assert!(results.is_empty());
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_live_batch_is_reconciled_and_sorted() {
        let fake = Arc::new(FakeGenerator::text(BATCH_REPLY));
        let engine = AiEngine::new(fake.clone());
        let input = jobs(3);

        let results = match_jobs(&engine, &profile(), &input, None).await;
        assert_eq!(fake.calls(), 1, "one LLM call per batch");

        let ids: Vec<&str> = results.iter().map(|r| r.job.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
        assert_eq!(results[0].score, 91);
        assert_eq!(results[1].score, 75);
        assert_eq!(results[1].insights, MISSING_TEXT);
        assert!(results.iter().all(|r| input.contains(&r.job)));
    }

    #[tokio::test]
    async fn test_prompt_contains_profile_and_every_job() {
        let fake = Arc::new(FakeGenerator::text("[]"));
        let engine = AiEngine::new(fake.clone());

        match_jobs(&engine, &profile(), &jobs(2), None).await;
        let prompt = fake.last_prompt().unwrap();
        assert!(prompt.contains("Python backend engineer"));
        assert!(prompt.contains("\"id\": \"1\""));
        assert!(prompt.contains("\"id\": \"2\""));
        assert!(prompt.contains("\"level\": \"Not specified\""));
    }

    #[tokio::test]
    async fn test_truncation_limits_prompt_and_output() {
        let fake = Arc::new(FakeGenerator::text(BATCH_REPLY));
        let engine = AiEngine::new(fake.clone());

        let results = match_jobs(&engine, &profile(), &jobs(3), Some(2)).await;
        let ids: BTreeSet<&str> = results.iter().map(|r| r.job.id.as_str()).collect();
        assert_eq!(ids, BTreeSet::from(["1", "2"]));
        assert!(!fake.last_prompt().unwrap().contains("\"id\": \"3\""));
    }

    #[tokio::test]
    async fn test_llm_failure_simulates_full_batch() {
        let engine = AiEngine::new(Arc::new(FakeGenerator::failing()));
        let input = jobs(5);

        let results = match_jobs(&engine, &profile(), &input, None).await;
        assert_eq!(results.len(), input.len());
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(results
            .iter()
            .any(|r| r.reason.contains("(SimError: API call/processing error:")));
    }

    #[tokio::test]
    async fn test_unparseable_reply_simulates_truncated_batch() {
        let engine = AiEngine::new(Arc::new(FakeGenerator::text("I can't rank these.")));
        let results = match_jobs(&engine, &profile(), &jobs(5), Some(3)).await;
        assert_eq!(results.len(), 3);
        assert!(results
            .iter()
            .any(|r| r.reason.contains("(SimError: API JSON parsing error:")));
    }

    #[tokio::test]
    async fn test_simulated_and_live_results_share_keys() {
        let live = match_jobs(
            &AiEngine::new(Arc::new(FakeGenerator::text(BATCH_REPLY))),
            &profile(),
            &jobs(3),
            None,
        )
        .await;
        let simulated = match_jobs(
            &AiEngine::simulated(SimulationReason::Forced),
            &profile(),
            &jobs(3),
            None,
        )
        .await;

        let expected = key_set(&live[0]);
        assert!(live.iter().chain(simulated.iter()).all(|r| key_set(r) == expected));
    }

    #[tokio::test]
    async fn test_simulated_python_job_example() {
        let engine = AiEngine::simulated(SimulationReason::Forced);
        let input = vec![job("1", "Python Dev")];

        let results = match_jobs(&engine, &profile(), &input, None).await;
        assert_eq!(results.len(), 1);
        assert!((30..=100).contains(&results[0].score));
        assert!(results[0].reason.contains("Python skill alignment"));
    }

    #[test]
    fn test_scores_are_clamped_and_coerced() {
        assert_eq!(read_score(Some(&json!(150))), 100);
        assert_eq!(read_score(Some(&json!(-20))), 0);
        assert_eq!(read_score(Some(&json!(87.6))), 88);
        assert_eq!(read_score(Some(&json!(" 64 "))), 64);
        assert_eq!(read_score(Some(&json!("80%"))), 80);
        assert_eq!(read_score(Some(&json!("high"))), 0);
        assert_eq!(read_score(Some(&json!(null))), 0);
        assert_eq!(read_score(None), 0);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let items = vec![
            json!({"id": "1", "match_score": 40, "match_reason": "first"}),
            json!({"id": "1", "match_score": 95, "match_reason": "second"}),
        ];
        let results = reconcile_matches(&items, &jobs(1));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].reason, "first");
    }

    #[test]
    fn test_items_without_id_are_dropped() {
        let items = vec![json!({"match_score": 40}), json!("not an object")];
        assert!(reconcile_matches(&items, &jobs(2)).is_empty());
    }

    #[test]
    fn test_non_string_text_fields_are_stringified() {
        let items = vec![json!({"id": "1", "match_score": 50, "job_insights": ["a", "b"]})];
        let results = reconcile_matches(&items, &jobs(1));
        assert_eq!(results[0].insights, "[\"a\",\"b\"]");
        assert_eq!(results[0].reason, MISSING_TEXT);
    }

    #[test]
    fn test_truncate_jobs_edges() {
        let all = jobs(4);
        assert_eq!(truncate_jobs(&all, None).len(), 4);
        assert_eq!(truncate_jobs(&all, Some(0)).len(), 4);
        assert_eq!(truncate_jobs(&all, Some(2)).len(), 2);
        assert_eq!(truncate_jobs(&all, Some(10)).len(), 4);
        assert_eq!(truncate_jobs(&all, Some(2))[1].id, "2");
    }

    #[test]
    fn test_long_descriptions_are_cut_for_the_prompt() {
        let mut long = job("1", "Engineer");
        long.description = Some("ä".repeat(DESCRIPTION_PROMPT_CHARS + 100));
        let summary = JobSummary::from(&long);
        assert_eq!(summary.description.chars().count(), DESCRIPTION_PROMPT_CHARS);
    }
}
