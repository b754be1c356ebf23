//! Matching data model: the candidate profile the LLM extracts, the job
//! records it scores, and the per-job results.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const NOT_MENTIONED: &str = "Not Mentioned";
pub const NOT_SPECIFIED: &str = "Not specified";

// ────────────────────────────────────────────────────────────────────────────
// Structured profile
// ────────────────────────────────────────────────────────────────────────────

/// A field the model returns sometimes as a sentence, sometimes as a list.
/// Null list items are skipped; a null field is an empty list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TextOrList {
    List(Vec<String>),
    Text(String),
}

impl Default for TextOrList {
    fn default() -> Self {
        TextOrList::List(Vec::new())
    }
}

impl<'de> Deserialize<'de> for TextOrList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => {
                TextOrList::List(items.iter().filter_map(value_to_text).collect())
            }
            Value::Null => TextOrList::default(),
            other => TextOrList::Text(value_to_text(&other).unwrap_or_default()),
        })
    }
}

/// Builds a record from a bare string the model wrote where an object was
/// expected, e.g. `"English (C1)"` in `other_languages`.
trait FromLooseText {
    fn from_loose_text(text: String) -> Self;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProficiency {
    #[serde(default = "not_mentioned", deserialize_with = "text_or_not_mentioned")]
    pub language: String,
    #[serde(default = "not_mentioned", deserialize_with = "text_or_not_mentioned")]
    pub proficiency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, deserialize_with = "string_list")]
    pub desired_roles: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub location_preferences: Vec<String>,
    #[serde(default)]
    pub work_model: TextOrList,
    #[serde(default = "not_mentioned", deserialize_with = "text_or_not_mentioned")]
    pub salary_expectations_eur_k_pa: String,
    #[serde(default)]
    pub company_culture_preferences: TextOrList,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            desired_roles: Vec::new(),
            location_preferences: Vec::new(),
            work_model: TextOrList::default(),
            salary_expectations_eur_k_pa: not_mentioned(),
            company_culture_preferences: TextOrList::default(),
        }
    }
}

impl FromLooseText for LanguageProficiency {
    fn from_loose_text(text: String) -> Self {
        Self {
            language: text,
            proficiency: not_mentioned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    #[serde(default = "not_mentioned", deserialize_with = "text_or_not_mentioned")]
    pub degree: String,
    #[serde(default = "not_mentioned", deserialize_with = "text_or_not_mentioned")]
    pub field: String,
    #[serde(default = "not_mentioned", deserialize_with = "text_or_not_mentioned")]
    pub institution: String,
    #[serde(default = "not_mentioned", deserialize_with = "text_or_not_mentioned")]
    pub graduation_year: String,
}

impl FromLooseText for EducationRecord {
    fn from_loose_text(text: String) -> Self {
        Self {
            degree: text,
            field: not_mentioned(),
            institution: not_mentioned(),
            graduation_year: not_mentioned(),
        }
    }
}

/// The LLM-derived view of a candidate's CV and stated preferences.
///
/// Every field has a default so a sparse model response still yields a
/// complete profile. Keys the model adds beyond this schema are kept in
/// `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredProfile {
    #[serde(default = "not_mentioned", deserialize_with = "text_or_not_mentioned")]
    pub summary: String,
    #[serde(default, deserialize_with = "string_list")]
    pub key_skills: Vec<String>,
    #[serde(default = "not_mentioned", deserialize_with = "text_or_not_mentioned")]
    pub experience_level: String,
    #[serde(default = "not_mentioned", deserialize_with = "text_or_not_mentioned")]
    pub german_language_proficiency: String,
    #[serde(default, deserialize_with = "record_list")]
    pub other_languages: Vec<LanguageProficiency>,
    #[serde(default, deserialize_with = "lenient_preferences")]
    pub preferences: Preferences,
    #[serde(default, deserialize_with = "record_list")]
    pub education: Vec<EducationRecord>,
    #[serde(default = "not_mentioned", deserialize_with = "text_or_not_mentioned")]
    pub extracted_cv_highlights: String,
    /// Set only on profiles produced by the simulation after a failed call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_during_api_call: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for StructuredProfile {
    fn default() -> Self {
        Self {
            summary: not_mentioned(),
            key_skills: Vec::new(),
            experience_level: not_mentioned(),
            german_language_proficiency: not_mentioned(),
            other_languages: Vec::new(),
            preferences: Preferences::default(),
            education: Vec::new(),
            extracted_cv_highlights: not_mentioned(),
            error_during_api_call: None,
            extra: Map::new(),
        }
    }
}

impl StructuredProfile {
    pub fn has_skill(&self, skill: &str) -> bool {
        self.key_skills.iter().any(|s| s == skill)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs and results
// ────────────────────────────────────────────────────────────────────────────

/// A job listing as seen by the matcher. Read-only input.
///
/// Accepts the legacy `job_title` / `company_name` keys and numeric ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "job_title", default)]
    pub title: String,
    #[serde(alias = "company_name", default)]
    pub company: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flexibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
}

impl JobRecord {
    pub fn level_or_default(&self) -> &str {
        or_not_specified(&self.level)
    }

    pub fn location_or_default(&self) -> &str {
        or_not_specified(&self.location)
    }

    pub fn industry_or_default(&self) -> &str {
        or_not_specified(&self.industry)
    }

    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// One job's evaluation against a profile. Same shape on the live and
/// simulated paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub job: JobRecord,
    /// 0..=100
    pub score: u8,
    pub reason: String,
    pub insights: String,
    pub tips: String,
}

/// Sorts by score, highest first. Stable: equal scores keep their order.
pub fn sort_by_score(results: &mut [MatchResult]) {
    results.sort_by(|a, b| b.score.cmp(&a.score));
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field readers
// ────────────────────────────────────────────────────────────────────────────

fn not_mentioned() -> String {
    NOT_MENTIONED.to_string()
}

fn or_not_specified(value: &Option<String>) -> &str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => NOT_SPECIFIED,
    }
}

/// Renders a scalar JSON value as text. `None` for null.
pub(crate) fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn text_or_not_mentioned<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value).unwrap_or_else(not_mentioned))
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_text(&value).ok_or_else(|| serde::de::Error::custom("job id must not be null"))
}

/// Accepts a list of scalars, a comma-separated string, or null.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(value_to_text).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    })
}

/// Placeholder answers the prompt allows in place of real content.
fn is_placeholder(text: &str) -> bool {
    let text = text.trim();
    text.is_empty()
        || text.eq_ignore_ascii_case(NOT_MENTIONED)
        || text.eq_ignore_ascii_case(NOT_SPECIFIED)
        || text.eq_ignore_ascii_case("n/a")
}

fn loose_record<T>(value: Value) -> Option<T>
where
    T: DeserializeOwned + FromLooseText,
{
    match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        Value::Null => None,
        other => value_to_text(&other)
            .filter(|text| !is_placeholder(text))
            .map(T::from_loose_text),
    }
}

/// Accepts a list of objects, a bare string, a placeholder, or null.
/// Items that cannot be read as a record are dropped, never the profile.
fn record_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromLooseText,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(loose_record).collect(),
        other => loose_record(other).into_iter().collect(),
    })
}

fn lenient_preferences<'de, D>(deserializer: D) -> Result<Preferences, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => Preferences::default(),
    })
}
