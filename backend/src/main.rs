use clap::Parser;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = backend::config::Config::parse();

    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target().contains("backend") || meta.target().contains("analysis")
        }));
    tracing::subscriber::set_global_default(registry)?;

    tracing::info!("Starting...");

    let state = std::sync::Arc::new(backend::AppState::from_config(&config));
    if state.submit_token.is_none() {
        tracing::warn!("No submit token configured, anyone can submit log lines");
    }

    let mut router = backend::api::router(state);
    if let Some(static_dir) = config.static_dir.as_ref() {
        tracing::info!("Serving static files from {:?}", static_dir);
        router = router.fallback_service(tower_http::services::ServeDir::new(static_dir));
    }
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind((config.bind.as_str(), config.port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;

    Ok(())
}
