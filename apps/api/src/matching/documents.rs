use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::engine::AiEngine;
use crate::matching::listings::fetch_job;
use crate::matching::writer::{
    generate_cover_letter, generate_custom_resume, DocumentKind, GeneratedDocument,
    GenerationSource,
};
use crate::models::document::GeneratedDocumentRow;
use crate::profile::store::get_profile;

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub job_id: String,
    pub document: GeneratedDocument,
    /// `None` when the document was not stored (blocked by the provider).
    pub stored: Option<GeneratedDocumentRow>,
}

/// Generates a cover letter or tailored resume for one job from the user's
/// stored CV, and stores it unless the provider refused.
pub async fn write_document(
    pool: &PgPool,
    engine: &AiEngine,
    user_id: Uuid,
    job_id: &str,
    kind: DocumentKind,
) -> Result<DocumentResponse, AppError> {
    let cv_text = get_profile(pool, user_id)
        .await?
        .map(|p| p.cv_text)
        .filter(|cv| !cv.trim().is_empty())
        .ok_or_else(|| {
            AppError::Validation(
                "Please complete your CV in your profile before generating documents.".to_string(),
            )
        })?;

    let job = fetch_job(pool, job_id).await?;

    let document = match kind {
        DocumentKind::CoverLetter => generate_cover_letter(engine, &cv_text, &job).await,
        DocumentKind::CustomResume => generate_custom_resume(engine, &cv_text, &job).await,
    };

    let stored = if document.is_storable() {
        let row = upsert_document(pool, user_id, &job.id, &document).await?;
        info!("Stored {} for user {user_id}, job {}", kind.as_str(), job.id);
        Some(row)
    } else {
        None
    };

    Ok(DocumentResponse {
        job_id: job.id,
        document,
        stored,
    })
}

/// One document per (user, job, kind); regenerating replaces the content.
pub async fn upsert_document(
    pool: &PgPool,
    user_id: Uuid,
    job_id: &str,
    document: &GeneratedDocument,
) -> Result<GeneratedDocumentRow, AppError> {
    Ok(sqlx::query_as::<_, GeneratedDocumentRow>(
        r#"
        INSERT INTO generated_documents (id, user_id, job_id, kind, content, simulated)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id, job_id, kind) DO UPDATE SET
            content = EXCLUDED.content,
            simulated = EXCLUDED.simulated,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(job_id)
    .bind(document.kind.as_str())
    .bind(&document.content)
    .bind(document.source == GenerationSource::Simulated)
    .fetch_one(pool)
    .await?)
}

pub async fn list_documents(
    pool: &PgPool,
    user_id: Uuid,
    job_id: &str,
) -> Result<Vec<GeneratedDocumentRow>, AppError> {
    Ok(sqlx::query_as::<_, GeneratedDocumentRow>(
        r#"
        SELECT *
        FROM generated_documents
        WHERE user_id = $1 AND job_id = $2
        ORDER BY kind ASC
        "#,
    )
    .bind(user_id)
    .bind(job_id)
    .fetch_all(pool)
    .await?)
}
