//! CV PDF upload: text extraction and archival of the original file.

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

pub const MAX_CV_BYTES: usize = 10 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Runs on the blocking pool; pdf-extract is CPU-bound and panics on some
/// malformed files, so a panicked task counts as an unreadable PDF.
pub async fn extract_pdf_text(bytes: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            if e.is_panic() {
                warn!("PDF extraction panicked");
                AppError::UnprocessableEntity("Error processing PDF file".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}"))
            }
        })?
        .map_err(|e| AppError::UnprocessableEntity(format!("Error processing PDF file: {e}")))?;

    let text = normalize_extracted_text(&text);
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the PDF file.".to_string(),
        ));
    }
    Ok(text)
}

/// Strips trailing whitespace per line and collapses runs of blank lines.
pub fn normalize_extracted_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines().map(str::trim_end) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}

pub fn cv_object_key(user_id: Uuid, upload_id: Uuid) -> String {
    format!("cvs/{user_id}/{upload_id}.pdf")
}

/// Stores the original PDF and returns its object key.
pub async fn store_cv_pdf(
    s3: &aws_sdk_s3::Client,
    s3_bucket: &str,
    user_id: Uuid,
    bytes: Bytes,
) -> Result<String, AppError> {
    let s3_key = cv_object_key(user_id, Uuid::new_v4());
    s3.put_object()
        .bucket(s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(bytes))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("CV upload failed: {e}")))?;

    info!("Uploaded CV to s3://{}/{}", s3_bucket, s3_key);
    Ok(s3_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_magic() {
        assert!(looks_like_pdf(b"%PDF-1.7\n%..."));
        assert!(!looks_like_pdf(b"PK\x03\x04 docx"));
        assert!(!looks_like_pdf(b""));
    }

    #[test]
    fn test_normalize_collapses_blank_runs() {
        let raw = "Jane Doe   \n\n\n\nExperience\t\n- Rust\n\n\n";
        assert_eq!(normalize_extracted_text(raw), "Jane Doe\n\nExperience\n- Rust");
    }

    #[test]
    fn test_object_key_is_scoped_per_user() {
        let user = Uuid::nil();
        let upload = Uuid::from_u128(1);
        assert_eq!(
            cv_object_key(user, upload),
            "cvs/00000000-0000-0000-0000-000000000000/00000000-0000-0000-0000-000000000001.pdf"
        );
    }

    #[tokio::test]
    async fn test_garbage_bytes_are_unprocessable() {
        let err = extract_pdf_text(Bytes::from_static(b"%PDF-1.4 not really"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }
}
