use crate::models::{DetectionResult, MrzRecord, ReaderConfig};
use crate::processing::{
    DetectionDecoder, DetectionGate, EngineStatus, ImageProcessor, OcrEngine, QuadCorrector,
    TemporalStabilizer, TextNormalizer,
};
use crate::utils::{MrzError, Result};
use crate::validation::{FormatMatcher, MrzValidator};
use image::{DynamicImage, GrayImage, RgbImage};
use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard};

/// One capture session: decodes frames and reports a stable MRZ once.
///
/// Per-frame decoding is stateless and may run on any thread; only the
/// stabilizer update is serialized. Dropping the reader ends the session.
pub struct MrzReader {
    config: ReaderConfig,
    matcher: FormatMatcher,
    gate: DetectionGate,
    stabilizer: Mutex<TemporalStabilizer>,
}

impl MrzReader {
    pub fn new(config: ReaderConfig) -> Result<Self> {
        config.validate()?;
        let matcher = FormatMatcher::new(config.issuing_state.as_deref())?;
        let gate = DetectionGate::new(config.expected_card, config.min_confidence);
        let stabilizer = Mutex::new(TemporalStabilizer::new(config.stabilizer));
        info!(
            "MRZ reader ready for {} ({:?} camera)",
            config.format(),
            config.camera
        );
        Ok(MrzReader {
            config,
            matcher,
            gate,
            stabilizer,
        })
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Ticks applied so far.
    pub fn frames_seen(&self) -> i64 {
        self.lock().frame_index()
    }

    /// Decodes one frame's OCR text into a checksum-valid record.
    pub fn decode_text(&self, raw: Option<&str>) -> Result<MrzRecord> {
        let raw = raw.unwrap_or_default();
        let mut text = TextNormalizer::normalize(raw);
        if self.config.strict_alphabet {
            text = TextNormalizer::restrict_to_alphabet(&text);
        }
        if text.is_empty() {
            return Err(MrzError::NoMatch("empty OCR text".to_string()));
        }

        let found = self.matcher.find(&text, self.config.format())?;
        MrzValidator::validate(&found, self.config.verify_composite)
    }

    /// Reads the MRZ from a detector crop: corrects the quadrilateral,
    /// rectifies it and runs OCR on the result.
    pub fn read_detection(
        &self,
        crop: &GrayImage,
        detection: &DetectionResult,
        engine: &dyn OcrEngine,
    ) -> Result<MrzRecord> {
        let keypoints = QuadCorrector::rescale_keypoints(
            &detection.keypoints,
            (self.config.model_input_width, self.config.model_input_height),
            crop.dimensions(),
        );
        let quad = QuadCorrector::correct(&keypoints)?;
        let rectified = ImageProcessor::rectify_or_whole(crop, &quad)?;
        self.read_image(&rectified, engine)
    }

    pub fn read_image(&self, image: &GrayImage, engine: &dyn OcrEngine) -> Result<MrzRecord> {
        if let EngineStatus::Unavailable(reason) = engine.status() {
            return Err(MrzError::EngineUnavailable(reason));
        }
        let text = engine.recognize(image)?;
        self.decode_text(text.as_deref())
    }

    /// Feeds one frame of OCR text. Returns the MRZ, whitespace removed,
    /// on the frame where it becomes stable.
    pub fn submit_text(&self, raw: Option<&str>) -> Option<String> {
        let decoded = self.decode_text(raw);
        self.apply(decoded)
    }

    /// Feeds an already-cropped frame through the OCR engine.
    pub fn submit_frame(&self, frame: &GrayImage, engine: &dyn OcrEngine) -> Option<String> {
        let decoded = self.read_image(frame, engine);
        self.apply(decoded)
    }

    /// Feeds one detector result. Detections of the wrong card type or below
    /// the confidence threshold are ignored without advancing the session.
    pub fn submit_detection(
        &self,
        crop: &GrayImage,
        detection: &DetectionResult,
        engine: &dyn OcrEngine,
    ) -> Option<String> {
        if !self.gate.accepts(detection) {
            return None;
        }
        let decoded = self.read_detection(crop, detection, engine);
        self.apply(decoded)
    }

    /// Rotates a camera frame upright and cuts its centered square. Returns
    /// the square as the crop later passed to `submit_raw_detection`, and
    /// the same square resized for the detector.
    pub fn prepare_detector_input(
        &self,
        frame: &DynamicImage,
        rotation_degrees: u32,
    ) -> Result<(GrayImage, RgbImage)> {
        let square = ImageProcessor::prepare_frame(frame, rotation_degrees)?;
        let input = ImageProcessor::model_input(
            &square,
            self.config.model_input_width,
            self.config.model_input_height,
        );
        Ok((square.to_luma8(), input))
    }

    /// Feeds raw detector tensors for `crop`. A malformed output counts as
    /// an empty frame; a gated-out detection does not advance the session.
    pub fn submit_raw_detection(
        &self,
        crop: &GrayImage,
        class_logits: &[f32],
        keypoints: &[f32],
        engine: &dyn OcrEngine,
    ) -> Option<String> {
        match DetectionDecoder::decode(class_logits, keypoints) {
            Ok(detection) => self.submit_detection(crop, &detection, engine),
            Err(e) => self.apply(Err(e)),
        }
    }

    /// Drops every tracked candidate and restarts the frame count.
    pub fn reset(&self) {
        *self.lock() = TemporalStabilizer::new(self.config.stabilizer);
    }

    fn apply(&self, decoded: Result<MrzRecord>) -> Option<String> {
        let mut stabilizer = self.lock();
        match decoded {
            Ok(record) => stabilizer.log_frame([record.mrz_string()]),
            Err(e) if e.is_frame_local() => {
                debug!("Frame {} contributed nothing: {}", stabilizer.frame_index(), e);
                stabilizer.log_frame(std::iter::empty::<String>());
            }
            Err(e) => {
                warn!("Frame {} failed: {}", stabilizer.frame_index(), e);
                stabilizer.log_frame(std::iter::empty::<String>());
            }
        }
        let stable = stabilizer.take_stable();
        if stable.is_some() {
            info!("MRZ stabilized at frame {}", stabilizer.frame_index() - 1);
        }
        stable
    }

    fn lock(&self) -> MutexGuard<'_, TemporalStabilizer> {
        // Every stabilizer update leaves it consistent, poisoned or not.
        self.stabilizer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
