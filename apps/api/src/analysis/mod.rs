//! Analysis pipeline: read uploads, extract profiles, score and rank.
//!
//! Work is sequential. A bad resume is skipped and reported; a bad job
//! description fails the whole analysis.

use tracing::{info, warn};

use crate::documents::{read_upload, UploadedFile};
use crate::errors::AppError;
use crate::extraction::{DocumentRole, Extractor};
use crate::models::candidate::{Candidate, JobDescription, SkippedUpload};
use crate::scoring::rank_candidates;
use crate::session::Session;

#[derive(Debug, Default)]
pub struct UploadBatch {
    pub job_description: Option<UploadedFile>,
    pub resumes: Vec<UploadedFile>,
}

#[derive(Debug)]
pub struct Analysis {
    pub job: JobDescription,
    /// Ranked, highest match first.
    pub candidates: Vec<Candidate>,
    pub skipped: Vec<SkippedUpload>,
}

pub async fn analyze(batch: UploadBatch, extractor: &dyn Extractor) -> Result<Analysis, AppError> {
    let jd_upload = batch
        .job_description
        .ok_or_else(|| AppError::Validation("A job description file is required".to_string()))?;
    let job = read_job_description(jd_upload, extractor).await?;

    let mut candidates = Vec::with_capacity(batch.resumes.len());
    let mut skipped = Vec::new();

    for upload in batch.resumes {
        match read_candidate(&upload, extractor).await {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => {
                warn!("Skipping resume '{}': {e}", upload.file_name);
                skipped.push(SkippedUpload {
                    file_name: upload.file_name.clone(),
                    reason: e.user_message(),
                });
            }
        }
    }

    rank_candidates(&mut candidates, &job);

    info!(
        "Analysis complete: backend={}, job_skills={}, candidates={}, skipped={}",
        extractor.backend(),
        job.profile.skills.len(),
        candidates.len(),
        skipped.len()
    );

    Ok(Analysis {
        job,
        candidates,
        skipped,
    })
}

/// Swaps in a new job description and reranks the existing candidates against it.
pub async fn replace_job_description(
    session: &mut Session,
    upload: UploadedFile,
    extractor: &dyn Extractor,
) -> Result<(), AppError> {
    let job = read_job_description(upload, extractor).await?;
    rank_candidates(&mut session.candidates, &job);
    info!(
        "Session {} rescored {} candidates against '{}'",
        session.id,
        session.candidates.len(),
        job.name
    );
    session.job = Some(job);
    session.last_error = None;
    Ok(())
}

async fn read_job_description(
    upload: UploadedFile,
    extractor: &dyn Extractor,
) -> Result<JobDescription, AppError> {
    let raw_text = read_upload(&upload).await?;
    let profile = extractor
        .extract(&raw_text, DocumentRole::JobDescription)
        .await?;
    Ok(JobDescription {
        name: upload.file_name,
        raw_text,
        profile,
    })
}

async fn read_candidate(
    upload: &UploadedFile,
    extractor: &dyn Extractor,
) -> Result<Candidate, AppError> {
    let raw_text = read_upload(upload).await?;
    let profile = extractor.extract(&raw_text, DocumentRole::Resume).await?;
    Ok(Candidate::new(upload.file_name.clone(), raw_text, profile))
}
