use taxdesk_server::{api::app_router, build_state, config::Config, init_tracing, scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);
    if config.ephemeral_jwt_secret {
        tracing::warn!("TD_JWT_SECRET is not set; using a random key, tokens will not survive a restart");
    }
    let state = build_state(&config).await?;

    scheduler::start_rate_limit_eviction(state.clone(), config.contact_window);

    let router = app_router(state, &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
