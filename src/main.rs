use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use walkie::audio::{audio_handler, speech_handler, DisabledTranscriber};
use walkie::config::Config;
use walkie::shared::AppState;
use walkie::signaling::signaling_handler;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walkie=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting walkie signaling server");

    let config = Config::from_env().expect("invalid WALKIE_* configuration");
    let bind_addr = config.bind_addr;

    // No transcription backend is wired in by default; inject one here to
    // enable the /ws-speech pipeline
    let app_state = AppState::new(config, Arc::new(DisabledTranscriber));

    // Browsers connect from arbitrary origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(|| async { "walkie signaling relay" }))
        .route("/ws", get(signaling_handler))
        .route("/ws-audio", get(audio_handler))
        .route("/ws-speech", get(speech_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await.unwrap();
    info!(addr = %bind_addr, "Server running");
    axum::serve(listener, app).await.unwrap();
}
