mod error;
mod routes;
mod state;

use anyhow::Result;
use shared::{build_info, Config, LogFormat};
use state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let build = build_info();
    info!(
        version = build.version,
        git_hash = build.git_hash,
        "Starting stock forecast dashboard..."
    );

    let state = AppState::from_config(&config)?;
    info!(dashboard = ?state.dashboard, "Dashboard ready");

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Dashboard listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
