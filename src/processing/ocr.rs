use crate::utils::Result;
use image::GrayImage;

/// Characters an MRZ can contain; used to restrict recognizers.
pub const MRZ_CHAR_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789<";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Ready,
    /// Still loading, or failed to load; the reason is for logs only.
    Unavailable(String),
}

/// Text recognizer run on rectified crops or already-cropped frames.
///
/// Implementations own their model loading. The reader checks `status`
/// before every call and treats a not-ready engine like a frame with no
/// text. Engines are shared by frame workers, hence `Send + Sync`.
pub trait OcrEngine: Send + Sync {
    fn status(&self) -> EngineStatus;

    /// Recognized text, or `None` when nothing was read.
    fn recognize(&self, image: &GrayImage) -> Result<Option<String>>;
}

#[cfg(feature = "tesseract")]
pub use self::tesseract_engine::TesseractEngine;

#[cfg(feature = "tesseract")]
mod tesseract_engine {
    use super::{EngineStatus, OcrEngine, MRZ_CHAR_WHITELIST};
    use crate::utils::{MrzError, Result};
    use image::GrayImage;
    use log::{debug, warn};
    use tesseract::Tesseract;

    /// Tesseract restricted to the MRZ alphabet. A fresh engine is built per
    /// call so one adapter can serve several worker threads.
    pub struct TesseractEngine {
        datapath: Option<String>,
        language: String,
        status: EngineStatus,
    }

    impl TesseractEngine {
        pub fn new(datapath: Option<&str>, language: &str) -> Self {
            let status = match Tesseract::new(datapath, Some(language)) {
                Ok(_) => EngineStatus::Ready,
                Err(e) => {
                    warn!("Tesseract init failed for {}: {}", language, e);
                    EngineStatus::Unavailable(e.to_string())
                }
            };
            TesseractEngine {
                datapath: datapath.map(str::to_string),
                language: language.to_string(),
                status,
            }
        }
    }

    impl OcrEngine for TesseractEngine {
        fn status(&self) -> EngineStatus {
            self.status.clone()
        }

        fn recognize(&self, image: &GrayImage) -> Result<Option<String>> {
            let temp_file = tempfile::Builder::new().suffix(".png").tempfile()?;
            image.save(temp_file.path())?;
            let image_path_str = temp_file.path().to_str().ok_or_else(|| {
                MrzError::EngineUnavailable("Failed to convert path to string".to_string())
            })?;

            let text = Tesseract::new(self.datapath.as_deref(), Some(&self.language))
                .map_err(|e| MrzError::EngineUnavailable(format!("Tesseract init error: {}", e)))?
                .set_image(image_path_str)
                .map_err(|e| {
                    MrzError::EngineUnavailable(format!("Tesseract set image error: {}", e))
                })?
                .set_variable("tessedit_char_whitelist", MRZ_CHAR_WHITELIST)
                .map_err(|e| {
                    MrzError::EngineUnavailable(format!("Tesseract set variable error: {}", e))
                })?
                .get_text()
                .map_err(|e| MrzError::EngineUnavailable(format!("Tesseract error: {}", e)))?;

            debug!("MRZ OCR result: {:?}", text);
            Ok(if text.trim().is_empty() { None } else { Some(text) })
        }
    }
}
