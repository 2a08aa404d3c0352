use thiserror::Error;

/// Every failure the decode pipeline can produce.
///
/// Per-frame variants (`DegenerateGeometry` through `EngineUnavailable`) are
/// expected on noisy input and are never surfaced to the host: the reader
/// turns them into "no candidate this frame".
#[derive(Debug, Error)]
pub enum MrzError {
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Invalid crop: computed size {width}x{height}")]
    InvalidCrop { width: f32, height: f32 },

    #[error("No MRZ match: {0}")]
    NoMatch(String),

    #[error("Truncated MRZ candidate after marker {marker}: {available} of {required} characters")]
    TruncatedCandidate {
        marker: String,
        available: usize,
        required: usize,
    },

    #[error("Check digit mismatch in {field}: computed {expected}, found {found}")]
    ChecksumMismatch {
        field: String,
        expected: char,
        found: char,
    },

    #[error("Malformed field: {0}")]
    MalformedField(String),

    #[error("Malformed detection: {0}")]
    MalformedDetection(String),

    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MrzError>;

impl MrzError {
    /// True for the errors a single noisy frame is expected to produce.
    pub fn is_frame_local(&self) -> bool {
        !matches!(
            self,
            MrzError::Io(_) | MrzError::Json(_) | MrzError::Config(_)
        )
    }
}
