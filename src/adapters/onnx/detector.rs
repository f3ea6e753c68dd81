use async_trait::async_trait;
use image::RgbImage;
use std::fs;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::adapters::onnx::yolo_engine::{OnnxYoloEngine, PLAYING_CARD_CLASSES};
use crate::application::ports::DetectorPort;
use crate::domain::{
    detection::Detection,
    errors::{DomainError, DomainResult},
    model::{InferenceConfig, YoloParams},
};

/// Card detector backed by a single shared ONNX session.
/// The session is loaded once at startup and serialized behind a Mutex,
/// since `Session::run` needs `&mut`.
pub struct OnnxDetector {
    engine: Arc<Mutex<OnnxYoloEngine>>,
    params: YoloParams,
}

impl OnnxDetector {
    pub fn load(
        infer: &InferenceConfig,
        classes: Vec<String>,
        intra_threads: usize,
    ) -> DomainResult<Self> {
        info!("Loading model '{}' from {}", infer.model.name, infer.model.onnx_path);
        let engine = OnnxYoloEngine::load(&infer.model.onnx_path, classes, intra_threads)
            .map_err(|e| DomainError::Inference(format!("failed to load model: {e:#}")))?;
        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            params: infer.params.clone(),
        })
    }
}

/// Reads one class name per line; blank lines are skipped.
/// Without a path the built-in 52-card table is used.
pub fn load_class_names(path: Option<&str>) -> DomainResult<Vec<String>> {
    let Some(path) = path else {
        return Ok(PLAYING_CARD_CLASSES.iter().map(|c| c.to_string()).collect());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| DomainError::NotFound(format!("labels file {path}: {e}")))?;
    let classes: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    if classes.is_empty() {
        return Err(DomainError::InvalidInput(format!("labels file {path} has no entries")));
    }
    if classes.len() != PLAYING_CARD_CLASSES.len() {
        warn!(
            "labels file {} has {} classes (expected {})",
            path,
            classes.len(),
            PLAYING_CARD_CLASSES.len()
        );
    }
    Ok(classes)
}

#[async_trait]
impl DetectorPort for OnnxDetector {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<Detection>> {
        let engine = self.engine.clone();
        let params = self.params.clone();

        tokio::task::spawn_blocking(move || {
            let mut eng = engine.lock().map_err(|_| {
                DomainError::OperationFailed("inference engine lock poisoned".into())
            })?;
            eng.infer(&image, &params)
                .map_err(|e| DomainError::Inference(format!("{e:#}")))
        })
        .await
        .map_err(|e| DomainError::OperationFailed(format!("inference task failed: {e}")))?
    }
}
