/// Analysis client — the single point of entry for all matching-service calls.
///
/// ARCHITECTURAL RULE: no other module talks to the remote service directly.
/// The submitter drives this boundary one chunk at a time.
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::{CandidateDocument, JobDescriptor};
use crate::results::AnalysisRecord;
use crate::selection::SelectionSet;

/// Fixed path the matching service exposes for batch analysis.
pub const ANALYZE_PATH: &str = "/analyzeManyCvs";

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Top-level response envelope: one record per CV in the chunk.
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    results: Vec<AnalysisRecord>,
}

/// The remote matching boundary. One implementation speaks HTTP; tests script it.
#[async_trait]
pub trait AnalyzeBackend: Send + Sync {
    /// Analyzes one chunk of CVs against the job description, returning the
    /// per-CV records in response order. Any non-success status is an error —
    /// per-CV failures come back as records, not as errors.
    async fn analyze_chunk(
        &self,
        job: &JobDescriptor,
        selection: &SelectionSet,
        documents: &[CandidateDocument],
    ) -> Result<Vec<AnalysisRecord>, AnalyzeError>;
}

/// HTTP implementation of the matching boundary.
///
/// Built without a request timeout: a submission has no retry or abort path,
/// so a hung request stalls it rather than failing it.
pub struct HttpAnalyzeClient {
    client: Client,
    base_url: String,
}

impl HttpAnalyzeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// GET / — reachability probe. The service answers with a plain status string.
    pub async fn health(&self) -> bool {
        match self.client.get(format!("{}/", self.base_url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Analysis service unreachable: {e}");
                false
            }
        }
    }
}

#[async_trait]
impl AnalyzeBackend for HttpAnalyzeClient {
    async fn analyze_chunk(
        &self,
        job: &JobDescriptor,
        selection: &SelectionSet,
        documents: &[CandidateDocument],
    ) -> Result<Vec<AnalysisRecord>, AnalyzeError> {
        let mut form = Form::new()
            .part(
                "job_description",
                Part::stream(Body::from(job.content.clone())).file_name(job.display_name.clone()),
            )
            .text("selectedOptions", selection.wire_params());

        for document in documents {
            form = form.part(
                "cvs",
                Part::stream(Body::from(document.content.clone()))
                    .file_name(document.name.clone()),
            );
        }

        let response = self
            .client
            .post(format!("{}{ANALYZE_PATH}", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Analysis API returned {status}: {message}");
            return Err(AnalyzeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: AnalyzeResponse = response.json().await?;
        debug!("Chunk analyzed: {} records", parsed.results.len());
        Ok(parsed.results)
    }
}
