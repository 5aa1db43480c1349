use anyhow::Context;
use knowgraph::{AppConfig, GraphStore, HttpServer, MemoryGraph, SeedGraph};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("knowgraph v{}", knowgraph::version());

    let config = AppConfig::from_env(std::env::args().nth(1)).context("loading configuration")?;

    let store = match &config.data_path {
        Some(path) => SeedGraph::from_path(path)
            .and_then(SeedGraph::into_store)
            .with_context(|| format!("loading graph fixture {}", path.display()))?,
        None => {
            warn!("No data_path configured; serving an empty graph");
            GraphStore::new()
        }
    };
    info!(
        "Graph loaded: {} nodes, {} edges",
        store.node_count(),
        store.edge_count()
    );

    let reader = Arc::new(MemoryGraph::new(store).with_locales(config.locales.supported.clone()));
    HttpServer::new(reader, config)
        .start()
        .await
        .context("running HTTP server")?;
    Ok(())
}
