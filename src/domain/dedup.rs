use std::collections::HashMap;

use super::detection::Detection;

/// Collapses detections sharing a label into the single most confident one.
///
/// A card can only appear once per frame, so repeated labels are treated as
/// redundant observations of the same card. On equal confidence the first
/// detection wins. Labels come out in first-seen order.
pub fn merge_duplicate_cards(detections: Vec<Detection>) -> Vec<Detection> {
    let mut best: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Detection> = Vec::new();

    for det in detections {
        match best.get(&det.label) {
            Some(&idx) => {
                if det.confidence > kept[idx].confidence {
                    kept[idx] = det;
                }
            }
            None => {
                best.insert(det.label.clone(), kept.len());
                kept.push(det);
            }
        }
    }
    kept
}
