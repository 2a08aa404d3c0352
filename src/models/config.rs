use crate::models::{CardType, DocumentFormat};
use crate::utils::{MrzError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Document type requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocType {
    #[serde(rename = "ID_CARD")]
    IdCard,
    #[serde(rename = "PASSPORT")]
    Passport,
}

impl From<DocType> for DocumentFormat {
    fn from(doc_type: DocType) -> Self {
        match doc_type {
            DocType::IdCard => DocumentFormat::TD1,
            DocType::Passport => DocumentFormat::TD3,
        }
    }
}

/// Camera selection is owned by the capture layer; carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraSelector {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Sightings inside the window needed before a value is reported.
    pub stable_count: i64,
    /// Ticks after which an unseen candidate is evicted.
    pub stale_after: i64,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        StabilizerConfig {
            stable_count: 10,
            stale_after: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub doc_type: DocType,
    pub camera: CameraSelector,
    pub min_confidence: f32,
    pub expected_card: CardType,
    pub model_input_width: u32,
    pub model_input_height: u32,
    /// Pin document markers to one three-letter issuing state (e.g. "TUR").
    pub issuing_state: Option<String>,
    pub strict_alphabet: bool,
    pub verify_composite: bool,
    pub stabilizer: StabilizerConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            doc_type: DocType::IdCard,
            camera: CameraSelector::Back,
            min_confidence: 0.8,
            expected_card: CardType::IdBack,
            model_input_width: 384,
            model_input_height: 384,
            issuing_state: None,
            strict_alphabet: false,
            verify_composite: false,
            stabilizer: StabilizerConfig::default(),
        }
    }
}

impl ReaderConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReaderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn format(&self) -> DocumentFormat {
        self.doc_type.into()
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(MrzError::Config(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.model_input_width == 0 || self.model_input_height == 0 {
            return Err(MrzError::Config(
                "model input dimensions must be positive".to_string(),
            ));
        }
        if self.stabilizer.stable_count < 1 {
            return Err(MrzError::Config(format!(
                "stabilizer.stable_count must be at least 1, got {}",
                self.stabilizer.stable_count
            )));
        }
        if self.stabilizer.stale_after < 0 {
            return Err(MrzError::Config(format!(
                "stabilizer.stale_after must not be negative, got {}",
                self.stabilizer.stale_after
            )));
        }
        if let Some(state) = &self.issuing_state {
            if state.len() != 3 || !state.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(MrzError::Config(format!(
                    "issuing_state must be three uppercase letters, got {:?}",
                    state
                )));
            }
        }
        Ok(())
    }
}
