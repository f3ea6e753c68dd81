use serde::{Deserialize, Serialize};

use super::clustering::Hand;
use super::detection::Detection;

/// Outcome of one recognition run over a single image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub detections: Vec<Detection>,
    pub hands: Vec<Hand>,
    pub count: usize,
}

impl PredictionResult {
    pub fn new(detections: Vec<Detection>, hands: Vec<Hand>) -> Self {
        Self { count: detections.len(), detections, hands }
    }
}

/// One-line, log-friendly summary, e.g. `P1[AS KH] P2[7D]`.
pub fn summarize_hands(hands: &[Hand]) -> String {
    hands
        .iter()
        .map(|h| {
            let cards = h.cards.iter().map(|c| c.label.as_str()).collect::<Vec<_>>().join(" ");
            format!("P{}[{}]", h.player_id, cards)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
