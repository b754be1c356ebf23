//! Cover letter and tailored resume generation, one job at a time, plain
//! text out.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::llm_client::{Generation, LlmError, TextGenerator};
use crate::matching::engine::{generate, AiEngine, AiError};
use crate::matching::models::JobRecord;
use crate::matching::prompts::{
    fill_template, COVER_LETTER_PROMPT_TEMPLATE, CUSTOM_RESUME_PROMPT_TEMPLATE,
};
use crate::matching::simulation::{simulate_cover_letter, simulate_custom_resume};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    CoverLetter,
    CustomResume,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::CoverLetter => "cover_letter",
            DocumentKind::CustomResume => "custom_resume",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DocumentKind::CoverLetter => "cover letter",
            DocumentKind::CustomResume => "custom resume",
        }
    }

    fn task(&self) -> &'static str {
        match self {
            DocumentKind::CoverLetter => "cover letter generation",
            DocumentKind::CustomResume => "custom resume generation",
        }
    }
}

/// Where a generated document's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    Llm,
    /// The provider refused; `content` explains why.
    Blocked,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    pub content: String,
    pub source: GenerationSource,
}

impl GeneratedDocument {
    /// Blocked placeholders are shown but never stored.
    pub fn is_storable(&self) -> bool {
        self.source != GenerationSource::Blocked
    }
}

/// Writes a short cover letter opening for `job` from the candidate's skills
/// or CV text.
pub async fn generate_cover_letter(
    engine: &AiEngine,
    skills_text: &str,
    job: &JobRecord,
) -> GeneratedDocument {
    generate_document(engine, DocumentKind::CoverLetter, skills_text, job).await
}

/// Rewrites the CV for `job`, keeping its structure.
pub async fn generate_custom_resume(
    engine: &AiEngine,
    cv_text: &str,
    job: &JobRecord,
) -> GeneratedDocument {
    generate_document(engine, DocumentKind::CustomResume, cv_text, job).await
}

async fn generate_document(
    engine: &AiEngine,
    kind: DocumentKind,
    candidate_text: &str,
    job: &JobRecord,
) -> GeneratedDocument {
    let Some(generator) = engine.generator(kind.task()) else {
        return simulated(kind, candidate_text, job, None);
    };

    match try_generate_document(generator, kind, candidate_text, job).await {
        Ok(document) => document,
        Err(e) => {
            error!("Gemini {} failed: {e}", kind.task());
            simulated(kind, candidate_text, job, Some(&e.to_string()))
        }
    }
}

pub async fn try_generate_document(
    generator: &dyn TextGenerator,
    kind: DocumentKind,
    candidate_text: &str,
    job: &JobRecord,
) -> Result<GeneratedDocument, AiError> {
    let prompt = build_document_prompt(kind, candidate_text, job);
    let generation = generate(generator, kind.task(), &prompt).await?;

    if let Generation {
        block_reason: Some(reason),
        ..
    } = &generation
    {
        warn!("{} generation was blocked. Reason: {reason}", kind.label());
        return Ok(GeneratedDocument {
            kind,
            content: format!(
                "(Could not generate {} due to safety settings. Reason: {reason})",
                kind.label()
            ),
            source: GenerationSource::Blocked,
        });
    }

    let content = generation
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(AiError::Upstream(LlmError::EmptyContent))?;

    Ok(GeneratedDocument {
        kind,
        content: content.to_string(),
        source: GenerationSource::Llm,
    })
}

fn build_document_prompt(kind: DocumentKind, candidate_text: &str, job: &JobRecord) -> String {
    let (template, candidate_key) = match kind {
        DocumentKind::CoverLetter => (COVER_LETTER_PROMPT_TEMPLATE, "{skills_text}"),
        DocumentKind::CustomResume => (CUSTOM_RESUME_PROMPT_TEMPLATE, "{cv_text}"),
    };

    fill_template(
        template,
        &[
            ("{job_title}", job.title.as_str()),
            ("{company}", job.company.as_str()),
            ("{level}", job.level_or_default()),
            ("{description}", job.description_or_empty()),
            (candidate_key, candidate_text),
        ],
    )
}

fn simulated(
    kind: DocumentKind,
    candidate_text: &str,
    job: &JobRecord,
    error: Option<&str>,
) -> GeneratedDocument {
    let content = match kind {
        DocumentKind::CoverLetter => simulate_cover_letter(candidate_text, job, error),
        DocumentKind::CustomResume => simulate_custom_resume(candidate_text, job, error),
    };
    GeneratedDocument {
        kind,
        content,
        source: GenerationSource::Simulated,
    }
}
