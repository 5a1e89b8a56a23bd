use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error};

use crate::analyze::AnalyzeBackend;
use crate::errors::AppError;
use crate::registry::{CandidateDocument, JobDescriptor};
use crate::results::AnalysisRecord;
use crate::selection::SelectionSet;

/// Documents per remote request. The service analyzes each CV individually,
/// so chunking bounds request size without changing results.
pub const CHUNK_SIZE: usize = 5;

/// Issues one remote request per chunk of [`CHUNK_SIZE`] documents, strictly
/// sequentially, and aggregates the responses in order. All-or-nothing: any
/// chunk failure discards every outcome accumulated so far.
pub struct BatchSubmitter {
    backend: Arc<dyn AnalyzeBackend>,
    in_flight: AtomicBool,
}

impl BatchSubmitter {
    pub fn new(backend: Arc<dyn AnalyzeBackend>) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    /// True while a submission is running. A second `submit` is rejected
    /// rather than queued or raced.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn submit(
        &self,
        job: &JobDescriptor,
        documents: &[CandidateDocument],
        selection: &SelectionSet,
    ) -> Result<Vec<AnalysisRecord>, AppError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(AppError::SubmissionInProgress);
        }
        let _guard = FlightGuard(&self.in_flight);

        let total = documents.len().div_ceil(CHUNK_SIZE);
        let mut records = Vec::with_capacity(documents.len());

        for (index, chunk) in documents.chunks(CHUNK_SIZE).enumerate() {
            debug!("Submitting chunk {}/{total} ({} CVs)", index + 1, chunk.len());
            let outcomes = self
                .backend
                .analyze_chunk(job, selection, chunk)
                .await
                .map_err(|e| {
                    error!("Chunk {}/{total} failed, discarding batch: {e}", index + 1);
                    AppError::Submission
                })?;
            records.extend(outcomes);
        }

        Ok(records)
    }
}

/// Clears the busy flag on every exit path, including early failure returns.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::AnalyzeError;
    use crate::results::Feedback;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn make_job() -> JobDescriptor {
        JobDescriptor {
            display_name: "jd.pdf".to_string(),
            content: Bytes::from_static(b"job description"),
        }
    }

    fn make_documents(count: usize) -> Vec<CandidateDocument> {
        (0..count)
            .map(|i| CandidateDocument::new(format!("cv_{i:02}.pdf"), Bytes::from_static(b"cv")))
            .collect()
    }

    fn ok_record(name: &str) -> AnalysisRecord {
        AnalysisRecord {
            filename: name.to_string(),
            feedback: Some(Feedback {
                match_percentage: Some(50.0),
                ..Default::default()
            }),
            error: None,
        }
    }

    /// Records the document names of every chunk it sees; optionally fails on
    /// one chunk index.
    struct ScriptedBackend {
        fail_on_chunk: Option<usize>,
        chunks_seen: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedBackend {
        fn new(fail_on_chunk: Option<usize>) -> Self {
            Self {
                fail_on_chunk,
                chunks_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AnalyzeBackend for ScriptedBackend {
        async fn analyze_chunk(
            &self,
            _job: &JobDescriptor,
            _selection: &SelectionSet,
            documents: &[CandidateDocument],
        ) -> Result<Vec<AnalysisRecord>, AnalyzeError> {
            let index = {
                let mut seen = self.chunks_seen.lock().unwrap();
                seen.push(documents.iter().map(|d| d.name.clone()).collect());
                seen.len() - 1
            };

            if self.fail_on_chunk == Some(index) {
                return Err(AnalyzeError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(documents.iter().map(|d| ok_record(&d.name)).collect())
        }
    }

    #[tokio::test]
    async fn test_twelve_documents_go_out_as_three_ordered_chunks() {
        let backend = Arc::new(ScriptedBackend::new(None));
        let submitter = BatchSubmitter::new(backend.clone());

        let documents = make_documents(12);
        let records = submitter
            .submit(&make_job(), &documents, &SelectionSet::default())
            .await
            .unwrap();

        let chunks = backend.chunks_seen.lock().unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 5);
        assert_eq!(chunks[1].len(), 5);
        assert_eq!(chunks[2].len(), 2);
        assert_eq!(chunks[0][0], "cv_00.pdf");
        assert_eq!(chunks[2][1], "cv_11.pdf");

        // Aggregated in submission order.
        assert_eq!(records.len(), 12);
        assert_eq!(records[0].filename, "cv_00.pdf");
        assert_eq!(records[11].filename, "cv_11.pdf");
    }

    #[tokio::test]
    async fn test_a_chunk_smaller_than_the_batch_size_is_one_request() {
        let backend = Arc::new(ScriptedBackend::new(None));
        let submitter = BatchSubmitter::new(backend.clone());

        submitter
            .submit(&make_job(), &make_documents(3), &SelectionSet::default())
            .await
            .unwrap();

        assert_eq!(backend.chunks_seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mid_batch_failure_discards_prior_outcomes_and_stops() {
        let backend = Arc::new(ScriptedBackend::new(Some(1)));
        let submitter = BatchSubmitter::new(backend.clone());

        let result = submitter
            .submit(&make_job(), &make_documents(12), &SelectionSet::default())
            .await;

        assert!(matches!(result, Err(AppError::Submission)));
        // The third chunk was never issued.
        assert_eq!(backend.chunks_seen.lock().unwrap().len(), 2);
        // The guard reset the busy flag despite the early return.
        assert!(!submitter.is_busy());
    }

    /// Holds the first chunk open until released, so the test can observe the
    /// in-flight state.
    struct BlockingBackend {
        release: Notify,
    }

    #[async_trait]
    impl AnalyzeBackend for BlockingBackend {
        async fn analyze_chunk(
            &self,
            _job: &JobDescriptor,
            _selection: &SelectionSet,
            documents: &[CandidateDocument],
        ) -> Result<Vec<AnalysisRecord>, AnalyzeError> {
            self.release.notified().await;
            Ok(documents.iter().map(|d| ok_record(&d.name)).collect())
        }
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_rejected() {
        let backend = Arc::new(BlockingBackend {
            release: Notify::new(),
        });
        let submitter = Arc::new(BatchSubmitter::new(backend.clone()));
        let job = make_job();
        let documents = make_documents(2);

        let first = {
            let submitter = submitter.clone();
            let job = job.clone();
            let documents = documents.clone();
            tokio::spawn(
                async move { submitter.submit(&job, &documents, &SelectionSet::default()).await },
            )
        };
        tokio::task::yield_now().await;
        assert!(submitter.is_busy());

        let second = submitter
            .submit(&job, &documents, &SelectionSet::default())
            .await;
        assert!(matches!(second, Err(AppError::SubmissionInProgress)));

        backend.release.notify_one();
        let outcome = first.await.unwrap();
        assert_eq!(outcome.unwrap().len(), 2);
        assert!(!submitter.is_busy());
    }
}
