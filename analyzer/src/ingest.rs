//! File ingestion: validation of candidate files and preview derivation.
//!
//! Drag-and-drop and manual pick are the caller's affordances; both funnel
//! into the same [`FileIngestor::ingest`] with identical validation.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;

use common::{FileCandidate, IngestConfig, SelectedFile, ValidationError};

/// Validates candidate files and hands out preview jobs. The generation
/// token makes preview results from superseded selections recognizable.
pub struct FileIngestor {
    config: IngestConfig,
    token: u64,
}

/// Deferred preview derivation for one accepted file. Run it off the hot
/// path (e.g. `tokio::spawn`) and feed the frame back to the workflow.
#[derive(Debug)]
pub struct PreviewJob {
    token: u64,
    media_type: String,
    bytes: Arc<Vec<u8>>,
}

/// A finished preview, tagged with the generation it belongs to.
pub struct PreviewFrame {
    pub token: u64,
    pub data_url: String,
}

impl PreviewJob {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub async fn render(self) -> PreviewFrame {
        let data_url = format!(
            "data:{};base64,{}",
            self.media_type,
            STANDARD.encode(self.bytes.as_slice())
        );
        PreviewFrame {
            token: self.token,
            data_url,
        }
    }
}

impl Default for FileIngestor {
    fn default() -> Self {
        FileIngestor::new(IngestConfig::default())
    }
}

impl FileIngestor {
    pub fn new(config: IngestConfig) -> Self {
        FileIngestor { config, token: 0 }
    }

    /// Validates a candidate and, on success, returns the accepted file
    /// (preview not yet available) together with the job deriving it.
    /// Each call supersedes any preview generation still in flight.
    pub fn ingest(
        &mut self,
        candidate: FileCandidate,
    ) -> Result<(SelectedFile, PreviewJob), ValidationError> {
        if !media_type_accepted(&self.config.accepted_types, &candidate.media_type) {
            return Err(ValidationError::UnsupportedMediaType {
                media_type: candidate.media_type,
                accepted: self.config.accepted_types.clone(),
            });
        }

        let size_bytes = candidate.bytes.len() as u64;
        if size_bytes == 0 {
            return Err(ValidationError::EmptyFile);
        }
        if size_bytes > self.config.max_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size_bytes,
                max_bytes: self.config.max_size_bytes,
            });
        }

        self.token += 1;
        debug!(
            "accepted {} ({} bytes, {}), preview token {}",
            candidate.name, size_bytes, candidate.media_type, self.token
        );

        let file = SelectedFile {
            name: candidate.name,
            media_type: candidate.media_type.clone(),
            size_bytes,
            bytes: Arc::clone(&candidate.bytes),
            preview: None,
        };
        let job = PreviewJob {
            token: self.token,
            media_type: candidate.media_type,
            bytes: candidate.bytes,
        };
        Ok((file, job))
    }

    /// Marks any in-flight preview generation as stale. Idempotent; called
    /// on removal and reset.
    pub fn invalidate(&mut self) {
        self.token += 1;
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.token == token
    }
}

/// Matches a declared media type against a comma-separated pattern list.
/// Each pattern is exact (`image/png`), a type wildcard (`image/*`), or the
/// catch-all `*/*`.
fn media_type_accepted(accepted: &str, media_type: &str) -> bool {
    accepted.split(',').map(str::trim).any(|pattern| {
        if pattern == "*/*" {
            return true;
        }
        match pattern.strip_suffix("/*") {
            Some(prefix) => media_type
                .split('/')
                .next()
                .is_some_and(|main| main == prefix),
            None => pattern.eq_ignore_ascii_case(media_type),
        }
    })
}
