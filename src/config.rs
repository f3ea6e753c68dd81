//! Server configuration, read from the environment (and `.env`).

use std::str::FromStr;

use crate::domain::{
    errors::DomainResult,
    model::{ClusterParams, InferenceConfig, ModelId, YoloParams},
};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path to the exported YOLO `.onnx` model.
    pub model_path: String,
    /// Optional class-name file, one label per line, in model index order.
    pub labels_path: Option<String>,
    pub yolo: YoloParams,
    pub intra_threads: usize,
    pub cluster: ClusterParams,
    /// Player count assumed when a request does not send one.
    pub default_num_players: usize,
    pub cors_origins: Vec<String>,
    pub max_body_size: usize,
    /// Directory served as a fallback (web frontend), if any.
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            model_path: "models/yolov8s_playing_cards.onnx".to_string(),
            labels_path: None,
            yolo: YoloParams::default(),
            intra_threads: 4,
            cluster: ClusterParams::default(),
            default_num_players: 2,
            cors_origins: vec!["*".to_string()],
            max_body_size: 20 * 1024 * 1024,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unset or unparsable
    /// values fall back to the defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let parse = |key: &str| Parsed(get(key));
        let non_empty = |key: &str| get(key).filter(|s| !s.trim().is_empty());

        Self {
            host: get("HOST").unwrap_or(d.host),
            port: parse("PORT").or(d.port),
            model_path: non_empty("MODEL_PATH").unwrap_or(d.model_path),
            labels_path: non_empty("LABELS_PATH"),
            yolo: YoloParams {
                input_size: parse("INPUT_SIZE").or(d.yolo.input_size),
                conf_threshold: parse("CONF_THRESHOLD").or(d.yolo.conf_threshold),
                iou_threshold: parse("IOU_THRESHOLD").or(d.yolo.iou_threshold),
                max_detections: parse("MAX_DETECTIONS").or(d.yolo.max_detections),
            },
            intra_threads: parse("INTRA_THREADS").or(d.intra_threads),
            cluster: ClusterParams {
                eps: parse("CLUSTER_EPS").or(d.cluster.eps),
                min_samples: parse("CLUSTER_MIN_SAMPLES").or(d.cluster.min_samples),
            },
            default_num_players: parse("DEFAULT_NUM_PLAYERS").or(d.default_num_players),
            cors_origins: get("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or(d.cors_origins),
            max_body_size: parse("MAX_BODY_SIZE").or(d.max_body_size),
            static_dir: non_empty("STATIC_DIR"),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        self.yolo.validate()?;
        self.cluster.validate()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn inference(&self) -> InferenceConfig {
        let name = std::path::Path::new(&self.model_path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolo".to_string());
        InferenceConfig {
            model: ModelId { name, onnx_path: self.model_path.clone() },
            params: self.yolo.clone(),
        }
    }
}

/// Raw env value, parsed into whatever type the target field needs.
struct Parsed(Option<String>);

impl Parsed {
    fn or<T: FromStr>(self, default: T) -> T {
        self.0.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
    }
}
