use axum::{extract::{rejection::JsonRejection, State}, Json};

use crate::adapters::http::{error::ApiError, state::HttpState};
use crate::application::dto::{HealthResponse, PredictRequest, PredictResponse};

pub async fn predict(
    State(st): State<HttpState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(req) = payload?;
    let bytes = req.image_bytes()?;
    let result = st.recognition.recognize(bytes, req.num_players).await?;
    Ok(Json(result.into()))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy".into() })
}
