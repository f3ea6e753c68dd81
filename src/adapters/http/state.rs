use std::sync::Arc;
use crate::application::services::RecognitionService;

/// Shared state for the Axum HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Recognition use case (injected detector + clustering parameters).
    pub recognition: Arc<RecognitionService>,
}
