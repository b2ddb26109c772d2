use anyhow::Result;
use linkrace::api::HttpServer;
use linkrace::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger from environment variable or default to info level
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    log::info!("Starting linkrace v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    log::info!("Link source: {}", config.wiki.api_url);
    log::info!(
        "Worker pool: {} workers, {}s traversal deadline",
        config.worker_count(),
        config.search.worker_timeout_secs
    );

    let server = HttpServer::new(config)?;
    server.run().await?;

    Ok(())
}
