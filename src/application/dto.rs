use base64::{prelude::BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::domain::{
    errors::{DomainError, DomainResult},
    prediction::PredictionResult,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Base64 image, optionally prefixed with a data URI header (`data:image/jpeg;base64,`).
    pub image: String,
    pub num_players: Option<usize>,
}

impl PredictRequest {
    pub fn image_bytes(&self) -> DomainResult<Vec<u8>> {
        decode_image_payload(&self.image)
    }
}

/// Strips an optional data URI header and decodes the base64 body.
/// Whitespace inside the body (line-wrapped base64) is ignored.
pub fn decode_image_payload(payload: &str) -> DomainResult<Vec<u8>> {
    let body = match payload.split_once(',') {
        Some((_, rest)) => rest,
        None => payload,
    };
    let body: Vec<u8> = body.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if body.is_empty() {
        return Err(DomainError::InvalidInput("image payload is empty".into()));
    }
    BASE64_STANDARD
        .decode(&body)
        .map_err(|e| DomainError::InvalidInput(format!("invalid base64 image: {e}")))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: PredictionResult,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self { success: true, result }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_prefix_is_stripped() {
        let raw = BASE64_STANDARD.encode(b"hello card");
        let uri = format!("data:image/png;base64,{raw}");
        assert_eq!(decode_image_payload(&raw).unwrap(), b"hello card");
        assert_eq!(decode_image_payload(&uri).unwrap(), b"hello card");
    }

    #[test]
    fn line_wrapped_base64_decodes() {
        assert_eq!(decode_image_payload("aGVsbG8g\nY2FyZA==").unwrap(), b"hello card");
        assert_eq!(decode_image_payload("data:,aGVs bG8g\r\nY2FyZA==\n").unwrap(), b"hello card");
    }

    #[test]
    fn invalid_base64_is_invalid_input() {
        let err = decode_image_payload("data:image/png;base64,***").unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(matches!(decode_image_payload(""), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn num_players_is_optional() {
        let req: PredictRequest = serde_json::from_str(r#"{"image":"AAAA"}"#).unwrap();
        assert_eq!(req.num_players, None);
    }

    #[test]
    fn response_flattens_result() {
        let resp = PredictResponse::from(PredictionResult::new(vec![], vec![]));
        let v = serde_json::to_value(&resp).unwrap();
        let expected =
            serde_json::json!({"success": true, "detections": [], "hands": [], "count": 0});
        assert_eq!(v, expected);
    }
}
