use anyhow::Result;
use api::session_store::{SessionStore, DEFAULT_SESSION_TTL};
use api::{build_router, AppState, DEFAULT_MAX_UPLOAD_BYTES};
use chatbot::{GeminiService, ServiceConfig};
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| match v.trim().parse() {
            Ok(n) => Some(n),
            Err(_) => {
                log::warn!("Ignoring unparseable {}={}", name, v);
                None
            }
        })
        .unwrap_or(default)
}

/// Sweeps idle sessions so memory is released even when nobody creates new ones.
fn spawn_session_sweeper(sessions: Arc<SessionStore>) {
    let period = sessions.ttl().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            sessions.evict_idle().await;
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let config = ServiceConfig::from_env();
    config.warn_if_unconfigured();
    log::info!("Using model {} at {}", config.model, config.api_base);

    let max_upload_bytes = env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES);
    let session_ttl = Duration::from_secs(env_or("SESSION_TTL_SECS", DEFAULT_SESSION_TTL.as_secs()));
    log::info!("Idle sessions expire after {} s", session_ttl.as_secs());

    let state = AppState::new(Arc::new(GeminiService::new(config)))
        .with_max_upload_bytes(max_upload_bytes)
        .with_session_ttl(session_ttl);
    spawn_session_sweeper(state.sessions.clone());
    let app = build_router(state);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
