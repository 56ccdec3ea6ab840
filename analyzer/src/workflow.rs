//! The upload/analysis state machine. One workflow instance owns the sole
//! authoritative copy of its state; every transition is triggered by a
//! discrete event and completes before the next is processed. Only the
//! analysis call itself suspends.

use log::{debug, warn};
use tokio::time::timeout;

use common::{
    AnalysisRequest, AnalysisResult, FileCandidate, IngestConfig, SelectedFile, ServiceError,
    WorkflowConfig, WorkflowError,
};

use crate::ingest::{FileIngestor, PreviewFrame, PreviewJob};
use crate::providers::AnalysisProvider;

/// Exactly one of these is active at any time. The sum type rules out
/// impossible combinations like "analyzing with no file".
#[derive(Debug)]
pub enum WorkflowState {
    Empty,
    FileSelected(SelectedFile),
    Analyzing(SelectedFile),
    Complete(AnalysisResult),
}

impl WorkflowState {
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowState::Empty => "empty",
            WorkflowState::FileSelected(_) => "file selected",
            WorkflowState::Analyzing(_) => "analyzing",
            WorkflowState::Complete(_) => "complete",
        }
    }
}

/// Proof that a submission happened, carrying the request and the sequence
/// number that identifies its response as current or stale.
pub struct AnalysisTicket {
    seq: u64,
    pub request: AnalysisRequest,
}

impl AnalysisTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

pub struct AnalysisWorkflow<P> {
    state: WorkflowState,
    ingestor: FileIngestor,
    provider: P,
    config: WorkflowConfig,
    /// Sequence of the most recent submission. A response whose sequence
    /// does not match is stale and gets dropped.
    seq: u64,
}

impl<P: AnalysisProvider> AnalysisWorkflow<P> {
    pub fn new(provider: P) -> Self {
        AnalysisWorkflow::with_config(provider, WorkflowConfig::default(), IngestConfig::default())
    }

    pub fn with_config(provider: P, config: WorkflowConfig, ingest: IngestConfig) -> Self {
        AnalysisWorkflow {
            state: WorkflowState::Empty,
            ingestor: FileIngestor::new(ingest),
            provider,
            config,
            seq: 0,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Accepts a candidate file. Valid from `Empty` (first selection) and
    /// `FileSelected` (replacement, superseding the previous preview). A
    /// failed validation surfaces the error and mutates nothing.
    pub fn select(&mut self, candidate: FileCandidate) -> Result<PreviewJob, WorkflowError> {
        match self.state {
            WorkflowState::Empty | WorkflowState::FileSelected(_) => {}
            WorkflowState::Analyzing(_) | WorkflowState::Complete(_) => {
                return Err(WorkflowError::InvalidTransition {
                    action: "select",
                    state: self.state.label(),
                })
            }
        }

        let (file, job) = self.ingestor.ingest(candidate)?;
        debug!("selected {} ({:.2} MB)", file.name, file.size_mb());
        self.state = WorkflowState::FileSelected(file);
        Ok(job)
    }

    /// Applies a finished preview to the held file. Returns false when the
    /// frame belongs to a superseded selection and was dropped.
    pub fn apply_preview(&mut self, frame: PreviewFrame) -> bool {
        if !self.ingestor.is_current(frame.token) {
            warn!("dropping stale preview (token {})", frame.token);
            return false;
        }
        match &mut self.state {
            WorkflowState::FileSelected(file) | WorkflowState::Analyzing(file) => {
                file.preview = Some(frame.data_url);
                true
            }
            _ => {
                warn!("dropping preview, no file held");
                false
            }
        }
    }

    /// Clears any held file and preview; idempotent. A reset while
    /// `Analyzing` makes the eventual response stale.
    pub fn remove(&mut self) {
        match self.state {
            WorkflowState::Empty
            | WorkflowState::FileSelected(_)
            | WorkflowState::Analyzing(_) => self.discard(),
            WorkflowState::Complete(_) => {}
        }
    }

    /// Discards the result (or anything else held) and returns to `Empty`.
    pub fn new_analysis(&mut self) {
        self.discard();
    }

    fn discard(&mut self) {
        debug!("reset from {}", self.state.label());
        self.seq += 1;
        self.ingestor.invalidate();
        self.state = WorkflowState::Empty;
    }

    /// Moves `FileSelected` to `Analyzing` and hands back the ticket for
    /// the single in-flight request. Any other state is a precondition
    /// error and mutates nothing.
    pub fn submit(&mut self) -> Result<AnalysisTicket, WorkflowError> {
        let file = match &self.state {
            WorkflowState::FileSelected(file) => file.clone(),
            _ => {
                return Err(WorkflowError::InvalidTransition {
                    action: "submit",
                    state: self.state.label(),
                })
            }
        };

        self.seq += 1;
        let request = AnalysisRequest::from_file(&file, self.config.timeframe.clone());
        debug!("submitting {} (seq {})", file.name, self.seq);
        self.state = WorkflowState::Analyzing(file);
        Ok(AnalysisTicket {
            seq: self.seq,
            request,
        })
    }

    /// Applies a successful service response. Stale responses (reset or
    /// resubmission happened in between) are dropped; a discarded workflow
    /// is never resurrected.
    pub fn resolve(&mut self, seq: u64, result: AnalysisResult) -> bool {
        if seq != self.seq || !matches!(self.state, WorkflowState::Analyzing(_)) {
            warn!(
                "dropping stale analysis response (seq {seq}, current {}, state {})",
                self.seq,
                self.state.label()
            );
            return false;
        }
        debug!("analysis complete (seq {seq})");
        self.state = WorkflowState::Complete(result);
        true
    }

    /// Applies a failed service response: back to `FileSelected` with the
    /// file retained so the user can resubmit. Stale failures are dropped.
    pub fn reject(&mut self, seq: u64, error: &ServiceError) -> bool {
        if seq != self.seq {
            warn!("dropping stale analysis failure (seq {seq}): {error}");
            return false;
        }
        match std::mem::replace(&mut self.state, WorkflowState::Empty) {
            WorkflowState::Analyzing(file) => {
                warn!("analysis failed, file retained for retry: {error}");
                self.state = WorkflowState::FileSelected(file);
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Drives one full analysis round: submit, call the provider under the
    /// configured timeout, feed the outcome back in. The error, if any, is
    /// surfaced to the caller as a transient notification.
    pub async fn run_analysis(&mut self) -> Result<&AnalysisResult, WorkflowError> {
        let ticket = self.submit()?;

        let outcome = timeout(self.config.timeout, self.provider.analyze(&ticket.request)).await;
        let error = match outcome {
            Ok(Ok(result)) => {
                self.resolve(ticket.seq, result);
                return match &self.state {
                    WorkflowState::Complete(result) => Ok(result),
                    // resolve refused: the workflow was reset mid-flight
                    _ => Err(WorkflowError::InvalidTransition {
                        action: "complete",
                        state: self.state.label(),
                    }),
                };
            }
            Ok(Err(error)) => error,
            Err(_) => ServiceError::Timeout(self.config.timeout),
        };

        self.reject(ticket.seq, &error);
        Err(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{sample_result, MockOutcome, MockProvider};
    use common::ValidationError;
    use std::time::Duration;

    fn chart_png() -> FileCandidate {
        FileCandidate::new("chart.png", "image/png", vec![0u8; 2 * 1024 * 1024])
    }

    fn workflow() -> AnalysisWorkflow<MockProvider> {
        AnalysisWorkflow::new(MockProvider::default())
    }

    #[test]
    fn test_select_then_remove_round_trip() {
        let mut wf = workflow();
        wf.select(chart_png()).unwrap();
        match wf.state() {
            WorkflowState::FileSelected(file) => assert_eq!(file.name, "chart.png"),
            other => panic!("expected file selected, got {}", other.label()),
        }

        wf.remove();
        assert!(matches!(wf.state(), WorkflowState::Empty));
        // idempotent
        wf.remove();
        assert!(matches!(wf.state(), WorkflowState::Empty));
    }

    #[test]
    fn test_invalid_select_leaves_state_unchanged() {
        let mut wf = workflow();

        let err = wf
            .select(FileCandidate::new(
                "document.pdf",
                "application/pdf",
                vec![1, 2, 3],
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::UnsupportedMediaType { .. })
        ));
        assert!(matches!(wf.state(), WorkflowState::Empty));

        let err = wf
            .select(FileCandidate::new(
                "huge.png",
                "image/png",
                vec![0u8; 15 * 1024 * 1024],
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::FileTooLarge { .. })
        ));
        assert!(matches!(wf.state(), WorkflowState::Empty));
    }

    #[test]
    fn test_submit_requires_selected_file() {
        let mut wf = workflow();
        assert!(matches!(
            wf.submit(),
            Err(WorkflowError::InvalidTransition { action: "submit", .. })
        ));
        assert!(matches!(wf.state(), WorkflowState::Empty));
    }

    #[test]
    fn test_single_request_in_flight() {
        let mut wf = workflow();
        wf.select(chart_png()).unwrap();

        let ticket = wf.submit().unwrap();
        // second submit while analyzing issues no second ticket
        assert!(wf.submit().is_err());
        assert!(matches!(wf.state(), WorkflowState::Analyzing(_)));

        assert!(wf.resolve(ticket.seq(), sample_result()));
        assert!(matches!(wf.state(), WorkflowState::Complete(_)));
    }

    #[test]
    fn test_stale_response_after_reset_is_dropped() {
        let mut wf = workflow();
        wf.select(chart_png()).unwrap();
        let ticket = wf.submit().unwrap();

        wf.remove();
        assert!(matches!(wf.state(), WorkflowState::Empty));

        // the service answers after the reset; the workflow stays discarded
        assert!(!wf.resolve(ticket.seq(), sample_result()));
        assert!(matches!(wf.state(), WorkflowState::Empty));
    }

    #[test]
    fn test_stale_response_after_resubmission_is_dropped() {
        let mut wf = workflow();
        wf.select(chart_png()).unwrap();
        let first = wf.submit().unwrap();

        let err = ServiceError::Status(503);
        assert!(wf.reject(first.seq(), &err));
        let second = wf.submit().unwrap();

        // first response arrives late; only the second one may complete
        assert!(!wf.resolve(first.seq(), sample_result()));
        assert!(matches!(wf.state(), WorkflowState::Analyzing(_)));
        assert!(wf.resolve(second.seq(), sample_result()));
    }

    #[test]
    fn test_reject_retains_file_for_retry() {
        let mut wf = workflow();
        wf.select(chart_png()).unwrap();
        let ticket = wf.submit().unwrap();

        let err = ServiceError::Timeout(Duration::from_secs(30));
        assert!(wf.reject(ticket.seq(), &err));
        match wf.state() {
            WorkflowState::FileSelected(file) => assert_eq!(file.name, "chart.png"),
            other => panic!("expected file selected, got {}", other.label()),
        }

        // retry works
        assert!(wf.submit().is_ok());
    }

    #[test]
    fn test_new_analysis_clears_everything() {
        let mut wf = workflow();
        wf.select(chart_png()).unwrap();
        let ticket = wf.submit().unwrap();
        wf.resolve(ticket.seq(), sample_result());

        wf.new_analysis();
        assert!(matches!(wf.state(), WorkflowState::Empty));
        assert!(wf.submit().is_err());
    }

    #[tokio::test]
    async fn test_preview_applies_only_to_current_selection() {
        let mut wf = workflow();
        let first_job = wf.select(chart_png()).unwrap();
        let second_job = wf
            .select(FileCandidate::new("chart.jpg", "image/jpeg", vec![9, 9]))
            .unwrap();

        let first_frame = first_job.render().await;
        let second_frame = second_job.render().await;

        // stale frame from the replaced file must never be shown
        assert!(!wf.apply_preview(first_frame));
        assert!(wf.apply_preview(second_frame));

        match wf.state() {
            WorkflowState::FileSelected(file) => {
                assert!(file.preview.as_deref().unwrap().starts_with("data:image/jpeg"))
            }
            other => panic!("expected file selected, got {}", other.label()),
        }
    }

    #[tokio::test]
    async fn test_preview_dropped_after_remove() {
        let mut wf = workflow();
        let job = wf.select(chart_png()).unwrap();
        wf.remove();

        let frame = job.render().await;
        assert!(!wf.apply_preview(frame));
    }

    #[tokio::test]
    async fn test_run_analysis_happy_path() {
        let mut wf = workflow();
        wf.select(chart_png()).unwrap();

        let result = wf.run_analysis().await.unwrap().clone();
        assert_eq!(result, sample_result());
        assert!(matches!(wf.state(), WorkflowState::Complete(_)));
        assert_eq!(wf.provider().calls(), 1);
    }

    #[tokio::test]
    async fn test_run_analysis_service_failure_reverts() {
        let mut wf = AnalysisWorkflow::new(MockProvider::failing_with_timeout());
        wf.select(FileCandidate::new("chart.jpg", "image/jpeg", vec![1, 2]))
            .unwrap();

        let err = wf.run_analysis().await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Service(ServiceError::Timeout(_))
        ));
        match wf.state() {
            WorkflowState::FileSelected(file) => assert_eq!(file.name, "chart.jpg"),
            other => panic!("expected file selected, got {}", other.label()),
        }
    }

    #[tokio::test]
    async fn test_run_analysis_times_out_slow_provider() {
        let provider = MockProvider::new(
            Duration::from_millis(200),
            MockOutcome::Succeed(sample_result()),
        );
        let config = WorkflowConfig {
            timeout: Duration::from_millis(20),
            timeframe: None,
        };
        let mut wf = AnalysisWorkflow::with_config(provider, config, IngestConfig::default());
        wf.select(chart_png()).unwrap();

        let err = wf.run_analysis().await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Service(ServiceError::Timeout(_))
        ));
        assert!(matches!(wf.state(), WorkflowState::FileSelected(_)));
    }
}
