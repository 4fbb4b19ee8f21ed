use axum::extract::Multipart;

use crate::analysis::UploadBatch;
use crate::documents::UploadedFile;
use crate::errors::AppError;

/// Reads `job_description` and `resumes` file fields from a multipart body.
/// Empty file inputs (no file chosen in the browser) are ignored; unknown fields are drained.
pub async fn read_batch(mut multipart: Multipart) -> Result<UploadBatch, AppError> {
    let mut batch = UploadBatch::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "job_description" | "resumes" | "resumes[]" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(String::from);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;

                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                let upload = UploadedFile {
                    file_name: if file_name.is_empty() {
                        "unnamed".to_string()
                    } else {
                        file_name
                    },
                    content_type,
                    bytes,
                };
                if field_name == "job_description" {
                    batch.job_description = Some(upload);
                } else {
                    batch.resumes.push(upload);
                }
            }
            _ => {
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;
            }
        }
    }

    Ok(batch)
}
