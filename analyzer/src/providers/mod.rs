mod cleaner;
mod core;
mod gemini;
mod mock;
mod prompter;
mod schemas;

pub use self::core::AnalysisProvider;
pub use gemini::{GeminiModel, GeminiProvider};
pub use mock::{sample_result, MockOutcome, MockProvider};
pub use prompter::build_prompt;
