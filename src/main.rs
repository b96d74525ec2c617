use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use portfolio_gateway::config::Args;
use portfolio_gateway::gateway::Gateway;
use portfolio_gateway::handlers::router;
use portfolio_gateway::provider::{CompletionProvider, OpenAiProvider};
use portfolio_gateway::rate_limit::{
    InMemoryRateLimitStore, MAX_REQUESTS_PER_WINDOW, SystemClock, WINDOW_DURATION, sweeper,
};
use portfolio_gateway::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    // system instruction is data, loaded once and passed through verbatim
    let system_instruction = std::fs::read_to_string(&args.system_prompt)
        .with_context(|| format!("reading system prompt from {}", args.system_prompt.display()))?;

    let provider = OpenAiProvider::new(
        reqwest::Client::new(),
        &args.provider_url,
        &args.model,
        args.api_key.clone(),
    );
    if !provider.has_credential() {
        warn!("OPENAI_API_KEY is not set - completion requests will be refused");
    }
    info!(url = provider.base_url(), model = provider.model(), "Completion provider configured");

    let store = Arc::new(InMemoryRateLimitStore::new());
    let clock = Arc::new(SystemClock);
    let gateway = Gateway::new(store.clone(), Arc::new(provider), clock.clone(), system_instruction)
        .with_upstream_timeout(Duration::from_secs(args.upstream_timeout));

    // spawn the background sweeper
    tokio::spawn(sweeper(store, clock, Duration::from_secs(args.sweep_interval)));

    let app = router(Arc::new(AppState::new(gateway)));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    info!("Gateway running on http://localhost:{}", args.port);
    info!(
        "Rate limit: {} requests per {} seconds per origin",
        MAX_REQUESTS_PER_WINDOW,
        WINDOW_DURATION.as_secs()
    );
    info!("Upstream timeout: {} seconds", args.upstream_timeout);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Gateway stopped");
    Ok(())
}

// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
