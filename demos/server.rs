//! REST API server demo
//!
//! Runs sailor against OMDb, Jackett and qBittorrent with the REST API
//! enabled. Credentials come from the environment or a `.env` file:
//! `OPEN_MOVIE_API_KEY`, `JACKETT_API_KEY`, `QBITTORRENT_USER`,
//! `QBITTORRENT_PASSWORD` and optionally `SAILOR_API_KEY`.
//!
//! Point qBittorrent's "run external program on torrent finished" at the
//! completion hook so each finished episode starts the next one:
//!
//! ```text
//! curl -X POST http://127.0.0.1:8000/torrent-finished
//! ```

use sailor::{Config, Providers, RangeOrchestrator, run_with_shutdown};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; the real environment still applies
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sailor=debug")),
        )
        .init();

    let config = Config::default().with_env_overrides();
    let bind_address = config.server.api.bind_address;

    let providers = Providers::from_config(&config.providers)?;
    let orchestrator = RangeOrchestrator::new(config, providers).await?;

    println!("sailor REST API");
    println!("  Swagger UI:      http://{}/swagger-ui", bind_address);
    println!("  Events stream:   http://{}/events", bind_address);
    println!("  Completion hook: POST http://{}/torrent-finished", bind_address);
    println!();
    println!("Start a campaign:");
    println!("  curl -X POST http://{}/campaigns \\", bind_address);
    println!("    -H 'Content-Type: application/json' \\");
    println!(
        "    -d '{{\"title\": \"the office\", \"media_type\": \"show\", \"min_season\": 2, \"max_season\": 3, \"reference_size\": 734003200}}'"
    );

    // Serves until SIGINT/SIGTERM, then shuts down cleanly
    run_with_shutdown(orchestrator).await?;

    Ok(())
}
