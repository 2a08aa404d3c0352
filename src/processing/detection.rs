use crate::models::{CardType, DetectionResult, Point};
use crate::utils::{MrzError, Result};
use log::trace;

pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max_score = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp_scores: Vec<f32> = scores.iter().map(|s| (s - max_score).exp()).collect();
    let sum: f32 = exp_scores.iter().sum();
    exp_scores.iter().map(|e| e / sum).collect()
}

/// Turns raw detector tensors into a [`DetectionResult`].
pub struct DetectionDecoder;

impl DetectionDecoder {
    /// `class_logits` holds one score per [`CardType`]; `keypoints` is the
    /// flat `[x0, y0, ..., x7, y7]` tensor in model-input coordinates.
    pub fn decode(class_logits: &[f32], keypoints: &[f32]) -> Result<DetectionResult> {
        if class_logits.is_empty() || class_logits.iter().any(|s| !s.is_finite()) {
            return Err(MrzError::MalformedDetection(format!(
                "class scores must be finite and non-empty: {:?}",
                class_logits
            )));
        }
        if keypoints.len() < 16 {
            return Err(MrzError::MalformedDetection(format!(
                "expected 16 keypoint values, got {}",
                keypoints.len()
            )));
        }

        let probabilities = softmax(class_logits);
        let (index, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, p)| if p > best.1 { (i, p) } else { best });
        let class_label = CardType::from_index(index).ok_or_else(|| {
            MrzError::MalformedDetection(format!("class index {} has no card type", index))
        })?;

        let mut points = [Point::default(); 8];
        for (i, point) in points.iter_mut().enumerate() {
            *point = Point::new(keypoints[2 * i], keypoints[2 * i + 1]);
        }

        Ok(DetectionResult {
            class_label,
            confidence,
            keypoints: points,
        })
    }
}

/// Decides whether a detection is worth reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionGate {
    pub expected: CardType,
    pub min_confidence: f32,
}

impl DetectionGate {
    pub fn new(expected: CardType, min_confidence: f32) -> Self {
        DetectionGate {
            expected,
            min_confidence,
        }
    }

    pub fn accepts(&self, detection: &DetectionResult) -> bool {
        let accepted =
            detection.class_label == self.expected && detection.confidence >= self.min_confidence;
        if !accepted {
            trace!(
                "Ignoring {:?} detection at confidence {:.3}",
                detection.class_label,
                detection.confidence
            );
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_keypoints() -> Vec<f32> {
        (0..16).map(|v| v as f32).collect()
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_is_shift_invariant() {
        let a = softmax(&[1000.0, 1001.0]);
        let b = softmax(&[0.0, 1.0]);
        assert!((a[1] - b[1]).abs() < 1e-6);
    }

    #[test]
    fn test_decode_picks_arg_max() {
        let result = DetectionDecoder::decode(&[0.0, 0.0, 5.0, 0.0, 0.0], &flat_keypoints()).unwrap();
        assert_eq!(result.class_label, CardType::IdBack);
        assert!(result.confidence > 0.9);
        assert_eq!(result.keypoints[0], Point::new(0.0, 1.0));
        assert_eq!(result.keypoints[7], Point::new(14.0, 15.0));
    }

    #[test]
    fn test_decode_rejects_short_keypoints() {
        assert!(matches!(
            DetectionDecoder::decode(&[1.0; 5], &[0.0; 15]),
            Err(MrzError::MalformedDetection(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_class_index() {
        let mut logits = vec![0.0; 6];
        logits[5] = 9.0;
        assert!(matches!(
            DetectionDecoder::decode(&logits, &flat_keypoints()),
            Err(MrzError::MalformedDetection(_))
        ));
    }

    #[test]
    fn test_gate_threshold_is_inclusive() {
        let gate = DetectionGate::new(CardType::IdBack, 0.8);
        let mut detection = DetectionResult {
            class_label: CardType::IdBack,
            confidence: 0.8,
            keypoints: [Point::default(); 8],
        };
        assert!(gate.accepts(&detection));
        detection.confidence = 0.79;
        assert!(!gate.accepts(&detection));
        detection.confidence = 0.95;
        detection.class_label = CardType::IdFront;
        assert!(!gate.accepts(&detection));
    }
}
