use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,       // logical name, e.g. "yolov8s_playing_cards"
    pub onnx_path: String,  // filesystem path
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoloParams {
    pub input_size: u32,        // 640 typical
    pub conf_threshold: f32,    // 0..1
    pub iou_threshold: f32,     // 0..1
    pub max_detections: usize,  // e.g. 300
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 100,
        }
    }
}

impl YoloParams {
    pub fn validate(&self) -> DomainResult<()> {
        if self.input_size == 0 {
            return Err(DomainError::InvalidInput("input_size must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.conf_threshold) {
            return Err(DomainError::InvalidInput(format!(
                "conf_threshold out of range: {}",
                self.conf_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(DomainError::InvalidInput(format!(
                "iou_threshold out of range: {}",
                self.iou_threshold
            )));
        }
        Ok(())
    }
}

/// DBSCAN parameters for grouping cards into hands.
///
/// `eps` is an absolute distance in image pixels, so it only holds for the
/// camera distance and resolution it was calibrated against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    pub eps: f32,
    pub min_samples: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self { eps: 150.0, min_samples: 1 }
    }
}

impl ClusterParams {
    pub fn validate(&self) -> DomainResult<()> {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "eps must be finite and > 0, got {}",
                self.eps
            )));
        }
        if self.min_samples == 0 {
            return Err(DomainError::InvalidInput("min_samples must be >= 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub model: ModelId,
    pub params: YoloParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cluster_params_are_valid() {
        let p = ClusterParams::default();
        assert_eq!(p.eps, 150.0);
        assert_eq!(p.min_samples, 1);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_bad_cluster_params() {
        for eps in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(ClusterParams { eps, min_samples: 1 }.validate().is_err());
        }
        assert!(ClusterParams { eps: 10.0, min_samples: 0 }.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        let p = YoloParams { conf_threshold: 1.5, ..YoloParams::default() };
        assert!(p.validate().is_err());
        assert!(YoloParams::default().validate().is_ok());
    }
}
