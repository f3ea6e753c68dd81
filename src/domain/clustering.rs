use serde::{Deserialize, Serialize};

use super::detection::{Detection, Point};
use super::model::ClusterParams;

/// A spatial group of cards presumed to belong to one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    /// Cluster id from this run; carries no identity across requests.
    pub hand_id: usize,
    pub player_id: usize,
    pub cards: Vec<Detection>,
    pub position: Point,
    pub card_count: usize,
}

/// Density-based clustering (DBSCAN) over a set of points.
///
/// Returns one label per point: `Some(cluster)` with ids assigned in discovery
/// order, or `None` for noise. A point's neighborhood includes itself, so with
/// `min_samples == 1` nothing is ever noise.
pub fn dbscan(points: &[Point], params: &ClusterParams) -> Vec<Option<usize>> {
    let n = points.len();
    let neighbors: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| points[i].distance(&points[j]) <= params.eps || i == j)
                .collect()
        })
        .collect();
    let is_core = |i: usize| neighbors[i].len() >= params.min_samples;

    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut next_cluster = 0;

    for start in 0..n {
        if labels[start].is_some() || !is_core(start) {
            continue;
        }
        let cluster = next_cluster;
        next_cluster += 1;
        labels[start] = Some(cluster);

        let mut stack = vec![start];
        while let Some(p) = stack.pop() {
            if !is_core(p) {
                continue;
            }
            for &q in &neighbors[p] {
                if labels[q].is_none() {
                    labels[q] = Some(cluster);
                    stack.push(q);
                }
            }
        }
    }
    labels
}

/// Groups deduplicated detections into hands and ranks them as players.
///
/// Hands are ordered top-to-bottom, then left-to-right, by their centroid;
/// `player_id` is the 1-based rank in that order. `num_players` is only a hint
/// and never changes the grouping.
pub fn cluster_cards_into_hands(
    detections: Vec<Detection>,
    num_players: usize,
    params: &ClusterParams,
) -> Vec<Hand> {
    if detections.is_empty() {
        return Vec::new();
    }

    let centers: Vec<Point> = detections.iter().map(Detection::center).collect();
    let labels = dbscan(&centers, params);

    // Noise points become singleton hands with ids after the real clusters.
    let mut next_id = labels.iter().flatten().max().map_or(0, |m| m + 1);
    let mut groups: Vec<(usize, Vec<Detection>)> = Vec::new();
    for (det, label) in detections.into_iter().zip(labels) {
        let id = label.unwrap_or_else(|| {
            next_id += 1;
            next_id - 1
        });
        match groups.iter_mut().find(|(gid, _)| *gid == id) {
            Some((_, cards)) => cards.push(det),
            None => groups.push((id, vec![det])),
        }
    }

    let mut hands: Vec<Hand> = groups
        .into_iter()
        .map(|(hand_id, cards)| {
            let centers: Vec<Point> = cards.iter().map(Detection::center).collect();
            let position = Point::mean(centers.iter()).unwrap_or(Point::new(f32::NAN, f32::NAN));
            Hand { hand_id, player_id: 0, card_count: cards.len(), cards, position }
        })
        .collect();

    hands.sort_by(|a, b| {
        a.position
            .y
            .total_cmp(&b.position.y)
            .then(a.position.x.total_cmp(&b.position.x))
    });
    for (rank, hand) in hands.iter_mut().enumerate() {
        hand.player_id = rank + 1;
    }

    if hands.len() != num_players {
        tracing::debug!(
            hands = hands.len(),
            num_players,
            "hand count differs from requested player count"
        );
    }
    hands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::BoundingBox;

    /// Detection whose box is centered on `(cx, cy)`.
    fn card(label: &str, cx: f32, cy: f32) -> Detection {
        Detection::new(label, 0.9, BoundingBox::new(cx - 20.0, cy - 30.0, cx + 20.0, cy + 30.0))
    }

    #[test]
    fn empty_input_gives_no_hands() {
        assert!(cluster_cards_into_hands(Vec::new(), 2, &ClusterParams::default()).is_empty());
    }

    #[test]
    fn close_cards_form_one_hand() {
        let hands = cluster_cards_into_hands(
            vec![card("AS", 0.0, 0.0), card("KH", 10.0, 10.0)],
            2,
            &ClusterParams::default(),
        );
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].card_count, 2);
        assert_eq!(hands[0].player_id, 1);
        assert_eq!(hands[0].position, Point::new(5.0, 5.0));
    }

    #[test]
    fn distant_cards_form_separate_hands_ranked_by_y() {
        let hands = cluster_cards_into_hands(
            vec![card("AS", 500.0, 500.0), card("KH", 0.0, 0.0)],
            2,
            &ClusterParams::default(),
        );
        assert_eq!(hands.len(), 2);
        assert!(hands.iter().all(|h| h.card_count == 1));
        assert_eq!(hands[0].player_id, 1);
        assert_eq!(hands[0].cards[0].label, "KH");
        assert_eq!(hands[1].player_id, 2);
        assert_eq!(hands[1].cards[0].label, "AS");
    }

    #[test]
    fn same_row_is_ordered_left_to_right() {
        let hands = cluster_cards_into_hands(
            vec![card("2C", 900.0, 100.0), card("3C", 100.0, 100.0), card("4C", 500.0, 100.0)],
            3,
            &ClusterParams::default(),
        );
        let order: Vec<&str> = hands.iter().map(|h| h.cards[0].label.as_str()).collect();
        assert_eq!(order, ["3C", "4C", "2C"]);
    }

    #[test]
    fn points_exactly_eps_apart_are_neighbors() {
        let hands = cluster_cards_into_hands(
            vec![card("AS", 0.0, 0.0), card("KH", 150.0, 0.0)],
            2,
            &ClusterParams::default(),
        );
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].card_count, 2);
    }

    #[test]
    fn neighbors_chain_into_one_cluster() {
        let pts = [Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(200.0, 0.0)];
        let labels = dbscan(&pts, &ClusterParams::default());
        assert_eq!(labels, vec![Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn isolated_point_is_noise_with_higher_min_samples() {
        let pts = [Point::new(0.0, 0.0), Point::new(50.0, 0.0), Point::new(1000.0, 1000.0)];
        let params = ClusterParams { eps: 150.0, min_samples: 2 };
        assert_eq!(dbscan(&pts, &params), vec![Some(0), Some(0), None]);

        let hands = cluster_cards_into_hands(
            vec![card("AS", 0.0, 0.0), card("AD", 50.0, 0.0), card("AH", 1000.0, 1000.0)],
            2,
            &params,
        );
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[1].cards[0].label, "AH");
        assert_eq!(hands[1].hand_id, 1);
    }

    #[test]
    fn every_card_lands_in_exactly_one_hand() {
        let input: Vec<Detection> = (0..12)
            .map(|i| card(&format!("C{i}"), (i % 4) as f32 * 120.0, (i / 4) as f32 * 400.0))
            .collect();
        let hands = cluster_cards_into_hands(input.clone(), 3, &ClusterParams::default());

        let mut seen: Vec<&str> = hands
            .iter()
            .flat_map(|h| h.cards.iter().map(|c| c.label.as_str()))
            .collect();
        seen.sort_unstable();
        let mut expected: Vec<&str> = input.iter().map(|c| c.label.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);

        assert_eq!(hands.len(), 3);
        for (i, h) in hands.iter().enumerate() {
            assert_eq!(h.player_id, i + 1);
            assert_eq!(h.card_count, h.cards.len());
        }
    }

    #[test]
    fn nan_box_becomes_its_own_hand() {
        let mut bad = card("JOKER", 0.0, 0.0);
        bad.bbox.x1 = f32::NAN;
        let hands = cluster_cards_into_hands(
            vec![card("AS", 0.0, 0.0), bad, card("KS", 20.0, 0.0)],
            1,
            &ClusterParams::default(),
        );
        assert_eq!(hands.len(), 2);
        assert_eq!(hands.iter().map(|h| h.card_count).sum::<usize>(), 3);
    }
}
