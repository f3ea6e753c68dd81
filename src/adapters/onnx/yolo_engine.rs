use anyhow::{bail, Result};
use image::{imageops::FilterType, RgbImage};
use ndarray::{s, Array4, ArrayView2, ArrayViewD, Axis, IxDyn};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Value;
use std::fs;

use crate::domain::detection::{BoundingBox, Detection};
use crate::domain::model::YoloParams;

/// Class names of the playing-card model, in training index order.
pub const PLAYING_CARD_CLASSES: [&str; 52] = [
    "10C", "10D", "10H", "10S", "2C", "2D", "2H", "2S", "3C", "3D", "3H", "3S",
    "4C", "4D", "4H", "4S", "5C", "5D", "5H", "5S", "6C", "6D", "6H", "6S",
    "7C", "7D", "7H", "7S", "8C", "8D", "8H", "8S", "9C", "9D", "9H", "9S",
    "AC", "AD", "AH", "AS", "JC", "JD", "JH", "JS", "KC", "KD", "KH", "KS",
    "QC", "QD", "QH", "QS",
];

pub struct OnnxYoloEngine {
    session: Session,
    classes: Vec<String>,
}

impl OnnxYoloEngine {
    pub fn load(path: &str, classes: Vec<String>, intra_threads: usize) -> Result<Self> {
        if classes.is_empty() {
            bail!("class list is empty");
        }
        let mut builder = Session::builder()?.with_intra_threads(intra_threads)?;

        // CUDA is optional: register it when available, otherwise stay on CPU.
        let cuda = CUDAExecutionProvider::default().build();
        if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
            builder = builder_with_cuda;
        }

        let model_bytes = fs::read(path)?;
        let session = builder.commit_from_memory(&model_bytes)?;

        Ok(Self { session, classes })
    }

    pub fn infer(&mut self, rgb: &RgbImage, params: &YoloParams) -> Result<Vec<Detection>> {
        let imgsz = params.input_size as usize;
        let resized =
            image::imageops::resize(rgb, imgsz as u32, imgsz as u32, FilterType::Triangle);

        let mut input = Array4::<f32>::zeros((1, 3, imgsz, imgsz));
        for (x, y, pixel) in resized.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }

        let input_shape = vec![1, 3, imgsz as i64, imgsz as i64];
        let (raw_input, _) = input.into_raw_vec_and_offset();
        let input_tensor = Value::from_array((input_shape, raw_input))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape_out.iter().map(|&x| x as usize).collect();
        let array_view = ArrayViewD::from_shape(IxDyn(&dims), data_out)?;
        let view = array_view.index_axis(Axis(0), 0).into_dimensionality()?;

        let sx = rgb.width() as f32 / imgsz as f32;
        let sy = rgb.height() as f32 / imgsz as f32;

        Ok(decode_output(view, &self.classes, sx, sy, params))
    }
}

/// Decodes a YOLOv8 head of shape `[4 + classes, candidates]` into detections
/// in original-image pixels, then applies class-wise NMS.
pub fn decode_output(
    view: ArrayView2<'_, f32>,
    classes: &[String],
    sx: f32,
    sy: f32,
    params: &YoloParams,
) -> Vec<Detection> {
    let num_candidates = view.shape()[1];
    let mut candidates: Vec<(usize, Detection)> = Vec::new();

    for i in 0..num_candidates {
        let scores = view.slice(s![4.., i]);
        let Some((class_id, &max_score)) = scores
            .indexed_iter()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };

        if max_score > params.conf_threshold {
            let cx = view[[0, i]];
            let cy = view[[1, i]];
            let w = view[[2, i]];
            let h = view[[3, i]];

            let bbox = BoundingBox::new(
                (cx - w / 2.0) * sx,
                (cy - h / 2.0) * sy,
                (cx + w / 2.0) * sx,
                (cy + h / 2.0) * sy,
            );
            if !bbox.is_finite() {
                continue;
            }
            let label = classes.get(class_id).map(String::as_str).unwrap_or("unknown");
            candidates.push((class_id, Detection::new(label, max_score, bbox)));
        }
    }

    candidates.sort_by(|a, b| b.1.confidence.total_cmp(&a.1.confidence));

    let mut kept: Vec<(usize, Detection)> = Vec::new();
    for (class_id, det) in candidates {
        let suppressed = kept.iter().any(|(k_class, k)| {
            *k_class == class_id && k.bbox.iou(&det.bbox) > params.iou_threshold
        });
        if !suppressed {
            kept.push((class_id, det));
            if kept.len() >= params.max_detections {
                break;
            }
        }
    }
    kept.into_iter().map(|(_, det)| det).collect()
}
