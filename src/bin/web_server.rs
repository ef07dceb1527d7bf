//! Web server for the member card API
//!
//! ```bash
//! cargo run --bin web_server -- --config config/server.toml
//! ```

use clap::Parser;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;

use member_card::common::config::AppConfig;
use member_card::logging::init_logger;
use member_card::login::InMemoryRegistry;
use member_card::web::{router, AppState};

/// Command-line arguments for the web server binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server configuration file (TOML format)
    #[arg(short, long, default_value = "config/server.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();
    let config = AppConfig::from_file(&args.config)?;

    let registry = Arc::new(InMemoryRegistry::from_accounts(config.accounts.clone()));
    info!("Loaded {} registered accounts", registry.len());

    let state = Arc::new(AppState::new(registry, &config.throttle));
    let app = router(state, config.server.max_upload_bytes);

    info!("Member card API running on http://{}", config.server.address);

    let listener = tokio::net::TcpListener::bind(&config.server.address).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
