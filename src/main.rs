use std::net::{Ipv4Addr, SocketAddr};

use tracing_subscriber::EnvFilter;

use medgate::config::Config;
use medgate::server::{AppState, router};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env();
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let state = AppState::new(&config)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "medgate listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to install ctrl-c handler");
    }
}
