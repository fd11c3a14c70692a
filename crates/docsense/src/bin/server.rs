//! Docsense server binary
//!
//! Run with: cargo run -p docsense --bin docsense-server

use std::path::PathBuf;

use docsense::{config::RagConfig, server::DocsenseServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up GOOGLE_API_KEY and DOCSENSE_* from a local .env
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsense=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var_os("DOCSENSE_CONFIG").map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Backend: {}", config.backend.as_str());
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!(
        "  - Retrieval: top {} chunks, fallback window {}",
        config.retrieval.top_k,
        config.retrieval.fallback_window
    );

    let server = DocsenseServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
