use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// A file as handed over by the caller, before any validation.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub media_type: String,
    pub bytes: Arc<Vec<u8>>,
}

impl FileCandidate {
    pub fn new(name: &str, media_type: &str, bytes: Vec<u8>) -> Self {
        FileCandidate {
            name: name.to_string(),
            media_type: media_type.to_string(),
            bytes: Arc::new(bytes),
        }
    }
}

/// A file that passed validation. Exists only inside the workflow; dropped
/// on removal or reset.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub bytes: Arc<Vec<u8>>,
    /// Displayable `data:` URL. Arrives as a follow-up event, never
    /// synchronously with selection.
    pub preview: Option<String>,
}

impl SelectedFile {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }
}

/// Image payload in the shape the provider wire format expects.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub mime_type: String,
    /// Base64 of the raw file bytes.
    pub data: String,
}

/// What actually goes over the analysis boundary. Opaque to the workflow
/// beyond "submittable".
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image: ImagePayload,
    pub timeframe: Option<String>,
}

impl AnalysisRequest {
    pub fn from_file(file: &SelectedFile, timeframe: Option<String>) -> Self {
        AnalysisRequest {
            image: ImagePayload {
                mime_type: file.media_type.clone(),
                data: STANDARD.encode(file.bytes.as_slice()),
            },
            timeframe,
        }
    }
}
