pub mod config;
pub mod data;

pub use config::{CameraSelector, DocType, ReaderConfig, StabilizerConfig};
pub use data::{
    CardType, DetectionResult, DocumentFormat, Line, MrzRecord, Point, Quadrilateral,
};
