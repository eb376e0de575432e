//! Scrobble Bot - Main entry point.

use anyhow::Context;
use lastfm_client::LastfmClient;
use scrobble_bot::bot::Bot;
use scrobble_bot::config::Config;
use scrobble_bot::error::AppResult;
use secrecy::ExposeSecret;
use signal_client::{MessageReceiver, SignalClient};
use std::sync::Arc;
use tokio::signal;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use user_registry::UsersService;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level);

    info!("Starting Scrobble Bot...");

    // Initialize clients
    let lastfm = Arc::new(
        LastfmClient::new(
            config.lastfm.api_key.expose_secret(),
            config.lastfm.shared_secret.expose_secret(),
            &config.lastfm.base_url,
            &config.lastfm.auth_url,
            config.lastfm.timeout,
        )
        .context("Failed to create Last.fm client")?,
    );

    let users = Arc::new(UsersService::new(lastfm.clone()));

    let signal = SignalClient::new(&config.signal.service_url, &config.signal.phone_number)
        .context("Failed to create Signal client")?;

    // Health checks
    if lastfm.health_check().await {
        info!("Last.fm reachable at {}", config.lastfm.base_url);
    } else {
        warn!("Last.fm health check failed - will retry on requests");
    }

    if !signal.health_check().await {
        error!("Signal API not reachable at {}", config.signal.service_url);
        return Err(anyhow::anyhow!("Signal API not reachable").into());
    }
    info!("Signal API healthy");

    let bot = Bot::new(
        users.clone(),
        signal.clone(),
        config.registration.follow_up_timeout,
    );

    info!("Registered {} command handlers", bot.handler_count());
    info!(
        "Registration follow-ups time out after {:?}",
        config.registration.follow_up_timeout
    );
    info!("Listening for messages...");

    // Start message receiver
    let receiver = MessageReceiver::new(signal.clone(), config.signal.poll_interval);
    let mut stream = Box::pin(receiver.stream());

    // Main message loop
    loop {
        tokio::select! {
            Some(message) = stream.next() => {
                bot.handle(&message).await;
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!(
        "Shutting down with {} registered and {} registering users",
        users.registered_count().await,
        users.registering_count().await
    );
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
