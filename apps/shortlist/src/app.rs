//! Application orchestration — every interactive operation as one method,
//! callable without any UI. Session mirroring happens at the defined points:
//! every registry mutation, every job upload, every successful submission.

use std::sync::Arc;

use tracing::info;

use crate::analyze::AnalyzeBackend;
use crate::classify::{classify, ClassifiedEntry, Cutoff};
use crate::errors::AppError;
use crate::export::{export_passing, ExportBundle};
use crate::registry::{CandidateDocument, FileRegistry, JobDescriptor};
use crate::results::ResultStore;
use crate::selection::{FeedbackDimension, SelectionSet};
use crate::session::{SessionState, SessionStore};
use crate::submit::BatchSubmitter;

/// Owns the whole pipeline: registry, job description, selection, results,
/// cutoff, the submitter, and the session mirror.
pub struct Shortlist {
    registry: FileRegistry,
    job: Option<JobDescriptor>,
    selection: SelectionSet,
    results: ResultStore,
    cutoff: Cutoff,
    submitter: BatchSubmitter,
    session: Arc<dyn SessionStore>,
}

impl Shortlist {
    pub fn new(backend: Arc<dyn AnalyzeBackend>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            registry: FileRegistry::default(),
            job: None,
            selection: SelectionSet::default(),
            results: ResultStore::default(),
            cutoff: Cutoff::default(),
            submitter: BatchSubmitter::new(backend),
            session,
        }
    }

    /// Restores the persisted facets at startup. Document bytes are not
    /// persisted, so restored file names are informational until re-uploaded.
    pub async fn restore(&mut self) -> SessionState {
        let state = self.session.load().await;
        self.results = ResultStore::from_records(state.results.clone());
        state
    }

    pub async fn add_documents(
        &mut self,
        documents: Vec<CandidateDocument>,
    ) -> Result<(), AppError> {
        self.registry.add(documents);
        self.session.save_file_names(&self.registry.names()).await
    }

    pub async fn remove_document(&mut self, name: &str) -> Result<(), AppError> {
        self.registry.remove(name);
        self.session.save_file_names(&self.registry.names()).await
    }

    /// Replaces the job description wholesale.
    pub async fn set_job_description(&mut self, job: JobDescriptor) -> Result<(), AppError> {
        self.session.save_job_name(&job.display_name).await?;
        self.job = Some(job);
        Ok(())
    }

    pub fn toggle_dimension(
        &mut self,
        dimension: FeedbackDimension,
        enabled: bool,
    ) -> Result<(), AppError> {
        self.selection.toggle(dimension, enabled)
    }

    pub fn set_cutoff(&mut self, value: i64) -> Result<(), AppError> {
        self.cutoff = Cutoff::new(value)?;
        Ok(())
    }

    /// Runs the whole batch. On success the result store is replaced wholesale
    /// and persisted; on any failure it is left untouched.
    pub async fn submit(&mut self) -> Result<usize, AppError> {
        let job = self.job.as_ref().ok_or_else(|| {
            AppError::Validation("Upload a job description before submitting".to_string())
        })?;
        if self.registry.is_empty() {
            return Err(AppError::Validation(
                "Upload at least one CV before submitting".to_string(),
            ));
        }

        let records = self
            .submitter
            .submit(job, self.registry.list(), &self.selection)
            .await?;
        let count = records.len();
        self.results.replace(records);
        self.session.save_results(self.results.records()).await?;
        info!("Submission complete: {count} results");
        Ok(count)
    }

    pub fn classified(&self) -> Vec<ClassifiedEntry> {
        classify(&self.results, self.cutoff)
    }

    pub fn export(&self) -> Result<ExportBundle, AppError> {
        export_passing(&self.registry, &self.classified(), self.cutoff)
    }

    /// Ends the session: every persisted facet is erased together and the
    /// in-memory state is dropped with it.
    pub async fn end_session(&mut self) -> Result<(), AppError> {
        self.registry = FileRegistry::default();
        self.job = None;
        self.results = ResultStore::default();
        self.session.clear().await
    }

    pub fn cutoff(&self) -> Cutoff {
        self.cutoff
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    /// Observable single-flight state, for hosts that poll before resubmitting.
    #[allow(dead_code)]
    pub fn is_busy(&self) -> bool {
        self.submitter.is_busy()
    }
}
