use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{detection::Detection, errors::DomainResult, model::ModelId};

/// Object detector producing raw, possibly duplicated, card detections.
#[async_trait]
pub trait DetectorPort: Send + Sync {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<Detection>>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}
