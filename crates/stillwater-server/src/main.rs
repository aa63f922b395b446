use stillwater_core::{Config, GuidanceClient};
use stillwater_server::{router, AppState};
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["stillwater_server=info", "stillwater_core=info"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> stillwater_core::error::Result<()> {
    let config = Config::load_or_default();
    let bind = std::env::var("STILLWATER_BIND").unwrap_or_else(|_| config.server.bind.clone());
    let client = GuidanceClient::new(config.guidance);
    if client.api_key().is_err() {
        tracing::warn!(var = %client.config().api_key_env, "no API key set, requests will fail");
    }

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "guidance server listening");
    axum::serve(listener, router(AppState::new(client)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
