//! Biography proxy server.
//!
//! Serves the biography endpoint the gallery posts to, holding the upstream
//! API key server-side. The key is read from `GEMINI_API_KEY`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pokedex_gallery::bio_proxy::{router, GeminiGenerator, ProxyState, BIO_ROUTE};
use pokedex_gallery::config::ProxyConfig;

#[derive(Debug, Parser)]
#[command(name = "bio-proxy", about = "Pokemon biography proxy")]
struct Args {
    /// RON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address, overriding the configuration
    #[arg(long)]
    bind: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = ProxyConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if config.api_key.is_none() {
        log::warn!("GEMINI_API_KEY is not set; every request will fail with a configuration error");
    }

    let client = reqwest::Client::builder()
        .build()
        .context("building HTTP client")?;
    let state = Arc::new(ProxyState {
        generator: Arc::new(GeminiGenerator::new(client, &config)),
    });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    let local_addr = listener.local_addr()?;
    log::info!(
        "Serving biographies at http://{}{} (model {})",
        local_addr,
        BIO_ROUTE,
        config.model
    );

    axum::serve(listener, app).await?;
    Ok(())
}
