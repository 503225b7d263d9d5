mod config;
mod wiring;

use std::error::Error;
use std::fs;
use std::path::Path;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "calc_server=info,runtime=info,api=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = config::Config::from_env()?;
    initialize_settings_dir(&config.settings_dir)?;
    info!(
        addr = %config.listen_addr,
        settings_dir = %config.settings_dir,
        utc_offset = %config.utc_offset,
        "starting futures capital projector"
    );

    let listener = TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, wiring::build_app(wiring::build_state(&config))).await?;
    Ok(())
}

fn initialize_settings_dir(path: &str) -> Result<(), std::io::Error> {
    let settings_dir = Path::new(path);
    if !settings_dir.as_os_str().is_empty() {
        fs::create_dir_all(settings_dir)?;
    }
    Ok(())
}
