use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use card_hand_server::adapters::{
    http::{router, state::HttpState},
    onnx::{
        detector::{load_class_names, OnnxDetector},
        model_catalog::OnnxModelCatalog,
    },
};
use card_hand_server::application::{ports::ModelCatalogPort, services::RecognitionService};
use card_hand_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 1. Logging (RUST_LOG defaults to info, LOG_FORMAT=json for production)
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if use_json {
        tracing_subscriber::registry().with(fmt::layer().json()).with(env_filter).init();
    } else {
        tracing_subscriber::registry().with(fmt::layer()).with(env_filter).init();
    }

    // 2. Configuration
    let config = ServerConfig::from_env();
    config.validate().context("invalid configuration")?;
    tracing::info!(
        eps = config.cluster.eps,
        min_samples = config.cluster.min_samples,
        "🔧 Clustering parameters"
    );

    // 3. Model: validated and loaded once at startup
    let infer = config.inference();
    OnnxModelCatalog::new()
        .validate_model(&infer.model)
        .await
        .context("model validation failed")?;
    let classes = load_class_names(config.labels_path.as_deref())?;
    let detector = Arc::new(OnnxDetector::load(&infer, classes, config.intra_threads)?);

    // 4. Services and HTTP state
    let recognition = Arc::new(RecognitionService::new(
        detector,
        config.cluster,
        config.default_num_players,
    ));
    let app = router(HttpState { recognition }, &config);

    // 5. Server
    let addr = config.bind_addr();
    tracing::info!("🚀 Card server listening on http://{}", addr);
    if let Some(dir) = &config.static_dir {
        tracing::info!("📂 Serving static files from '{}'", dir);
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
