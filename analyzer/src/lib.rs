pub mod ingest;
pub mod presenter;
pub mod providers;
pub mod workflow;

pub use ingest::{FileIngestor, PreviewFrame, PreviewJob};
pub use providers::{AnalysisProvider, GeminiModel, GeminiProvider, MockProvider};
pub use workflow::{AnalysisTicket, AnalysisWorkflow, WorkflowState};
