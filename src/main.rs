use dotenvy::dotenv;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use signup_board::commands::{self, USAGE};
use signup_board::{ActivitiesClient, BoardConfig, HtmlBoard, RosterSync};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok();

    // 1. Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. Config
    let config = BoardConfig::from_env().expect("Invalid board configuration");
    info!(
        api_url = %config.api_url,
        output = %config.output_path.display(),
        ordering = ?config.sync.ordering,
        "signup board starting"
    );

    // 3. Synchronizer + presenter
    let board = Arc::new(HtmlBoard::new(&config.output_path));
    let sync = Arc::new(RosterSync::new(
        ActivitiesClient::new(config.api_url.clone()),
        board,
        config.sync.clone(),
    ));

    if let Err(e) = sync.refresh().await {
        warn!(error = %e, "initial roster load failed");
    }
    println!("Board is written to {}", config.output_path.display());
    println!("{}", USAGE);

    // 4. User gestures, one per line
    commands::run_lines(BufReader::new(tokio::io::stdin()), sync).await;

    info!("signup board stopped");
}
