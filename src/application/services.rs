use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::{
    application::ports::DetectorPort,
    domain::{
        clustering::cluster_cards_into_hands,
        dedup::merge_duplicate_cards,
        errors::{DomainError, DomainResult},
        model::ClusterParams,
        prediction::{summarize_hands, PredictionResult},
    },
};

/// Main use case: image -> detections -> hands.
#[derive(Clone)]
pub struct RecognitionService {
    detector: Arc<dyn DetectorPort>,
    cluster: ClusterParams,
    default_num_players: usize,
}

impl RecognitionService {
    pub fn new(
        detector: Arc<dyn DetectorPort>,
        cluster: ClusterParams,
        default_num_players: usize,
    ) -> Self {
        Self { detector, cluster, default_num_players }
    }

    /// Decodes the encoded image bytes, runs the detector, deduplicates the
    /// detections and groups them into hands.
    pub async fn recognize(
        &self,
        image_bytes: Vec<u8>,
        num_players: Option<usize>,
    ) -> DomainResult<PredictionResult> {
        let num_players = num_players.unwrap_or(self.default_num_players);

        let rgb = tokio::task::spawn_blocking(move || {
            image::load_from_memory(&image_bytes)
                .map(|img| img.to_rgb8())
                .map_err(|e| DomainError::Decode(e.to_string()))
        })
        .await
        .map_err(|e| DomainError::OperationFailed(format!("decode task failed: {e}")))??;

        let (width, height) = rgb.dimensions();
        let t_start = Instant::now();
        let raw = self.detector.detect(rgb).await?;
        let infer_ms = t_start.elapsed().as_secs_f32() * 1000.0;

        let raw_count = raw.len();
        let detections = merge_duplicate_cards(raw);
        let hands = cluster_cards_into_hands(detections.clone(), num_players, &self.cluster);

        info!(
            width,
            height,
            raw = raw_count,
            cards = detections.len(),
            hands = hands.len(),
            infer_ms,
            "prediction: {}",
            summarize_hands(&hands)
        );

        Ok(PredictionResult::new(detections, hands))
    }
}
