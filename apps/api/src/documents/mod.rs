//! Document text extraction for uploaded resumes and job descriptions.
//!
//! PDF goes through `pdf-extract`, DOCX through `docx-rs`. Parsing runs on the
//! blocking pool; a parser panic is reported as a corrupt document.

use std::path::Path;

use bytes::Bytes;
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("'{file_name}' is not a supported format (PDF, DOCX or TXT)")]
    Unsupported { file_name: String },

    #[error("Could not read '{file_name}'. The file may be corrupted or invalid: {message}")]
    Corrupt { file_name: String, message: String },

    #[error("No text could be extracted from '{file_name}'")]
    Empty { file_name: String },
}

/// A single file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl DocumentKind {
    /// Detects the kind from the file extension, falling back to the declared content type.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("pdf") => return Some(DocumentKind::Pdf),
            Some("docx") => return Some(DocumentKind::Docx),
            Some("txt") => return Some(DocumentKind::Text),
            _ => {}
        }

        let content_type = content_type?.to_lowercase();
        if content_type.contains("wordprocessingml") {
            Some(DocumentKind::Docx)
        } else if content_type.starts_with("application/pdf") {
            Some(DocumentKind::Pdf)
        } else if content_type.starts_with("text/plain") {
            Some(DocumentKind::Text)
        } else {
            None
        }
    }
}

/// Extracts the text of an uploaded file. Whitespace-only output counts as empty.
pub async fn read_upload(upload: &UploadedFile) -> Result<String, DocumentError> {
    let file_name = upload.file_name.clone();
    let kind = DocumentKind::detect(&upload.file_name, upload.content_type.as_deref())
        .ok_or_else(|| DocumentError::Unsupported {
            file_name: file_name.clone(),
        })?;

    let bytes = upload.bytes.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
        .await
        .map_err(|e| DocumentError::Corrupt {
            file_name: file_name.clone(),
            message: format!("parser aborted: {e}"),
        })?
        .map_err(|message| DocumentError::Corrupt {
            file_name: file_name.clone(),
            message,
        })?;

    if text.trim().is_empty() {
        return Err(DocumentError::Empty { file_name });
    }
    Ok(text)
}

/// Synchronous extraction. Errors are returned as display strings.
pub fn extract_text(kind: DocumentKind, data: &[u8]) -> Result<String, String> {
    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(data).map_err(|e| e.to_string()),
        DocumentKind::Docx => extract_docx(data),
        DocumentKind::Text => String::from_utf8(data.to_vec()).map_err(|e| e.to_string()),
    }
}

fn extract_docx(data: &[u8]) -> Result<String, String> {
    let docx = docx_rs::read_docx(data).map_err(|e| e.to_string())?;
    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            for run in &paragraph.children {
                if let ParagraphChild::Run(run) = run {
                    for run_child in &run.children {
                        if let RunChild::Text(t) = run_child {
                            line.push_str(&t.text);
                        }
                    }
                }
            }
            paragraphs.push(line);
        }
    }
    Ok(paragraphs.join("\n"))
}
