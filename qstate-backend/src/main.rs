use anyhow::Context;
use clap::Parser;
use qstate_backend::{DEFAULT_SYNTHESIS_URL, HttpSynthesisClient, router};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// HTTP front for wavefunction conversion and circuit synthesis.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Config {
    /// Address to listen on.
    #[arg(long, env = "QSTATE_BIND", default_value = "0.0.0.0:3000")]
    bind: String,

    /// State-preparation service endpoint.
    #[arg(long, env = "QSTATE_SYNTHESIS_URL", default_value = DEFAULT_SYNTHESIS_URL)]
    synthesis_url: String,

    /// Seconds to wait for the service before giving up.
    #[arg(long, env = "QSTATE_SYNTHESIS_TIMEOUT", default_value_t = 60)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::parse();
    let client =
        HttpSynthesisClient::new(&config.synthesis_url, Duration::from_secs(config.timeout_secs))?;
    let app = router(client);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!(bind = %config.bind, synthesis_url = %config.synthesis_url, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
