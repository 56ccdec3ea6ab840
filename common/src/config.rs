use std::time::Duration;

pub const DEFAULT_ACCEPTED_TYPES: &str = "image/*";
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

/// Input boundary configuration: which media types are accepted and how
/// large a file may be.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Comma-separated patterns, each either exact (`image/png`) or a
    /// wildcard (`image/*`).
    pub accepted_types: String,
    pub max_size_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            accepted_types: DEFAULT_ACCEPTED_TYPES.to_string(),
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Upper bound on a single analysis call. A call that exceeds it is
    /// treated as failed.
    pub timeout: Duration,
    /// Desired timeframe forwarded to the provider, if any.
    pub timeframe: Option<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig {
            timeout: DEFAULT_ANALYSIS_TIMEOUT,
            timeframe: None,
        }
    }
}
