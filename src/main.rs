use signalhub::{build_router, AppConfig, AppState, EventDispatcher};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signalhub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting signaling server");

    let config = Arc::new(AppConfig::from_env());

    // The dispatcher task owns all room and connection state
    let (signaling, _dispatcher_task) = EventDispatcher::spawn(&config);
    let app_state = AppState::new(signaling, Arc::clone(&config));

    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(bind_addr = %config.bind_addr, error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(bind_addr = %config.bind_addr, "Server running");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
