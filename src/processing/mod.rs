pub mod detection;
pub mod geometry;
pub mod image;
pub mod normalizer;
pub mod ocr;
pub mod stabilizer;

pub use detection::{DetectionDecoder, DetectionGate};
pub use geometry::QuadCorrector;
pub use image::ImageProcessor;
pub use normalizer::TextNormalizer;
pub use ocr::{EngineStatus, OcrEngine};
#[cfg(feature = "tesseract")]
pub use ocr::TesseractEngine;
pub use stabilizer::{TemporalStabilizer, TrackedCandidate};
