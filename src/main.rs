mod config;
mod db;
mod entities;
mod error;
mod feed;
mod models;
mod processor;
mod scraper;
mod store;
mod telegram;
mod templates;

use tokio::sync::oneshot;

use crate::{
    config::Config, feed::HttpFeed, processor::Poller, scraper::HttpPages, store::SeenLinkStore,
    telegram::TelegramNotifier,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,reelfeed=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let http = wreq::Client::builder().timeout(config.http_timeout).build()?;

    let db = db::connect(&config.database_url).await?;

    let feed = HttpFeed::new(http.clone(), config.feed_url.clone(), config.user_agent.clone());
    let pages = HttpPages::new(http.clone(), config.user_agent.clone());
    let notifier = TelegramNotifier::new(
        http,
        config.telegram_bot_token.clone(),
        config.telegram_chat_id.clone(),
        config.telegram_api_base.clone(),
    );

    let poller = Poller::start(feed, pages, SeenLinkStore::new(db), notifier, config.poll_interval)
        .await?;

    let (stop_tx, stop_rx) = oneshot::channel();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(());
    });

    tracing::info!(feed = %config.feed_url, "watching feed");
    poller
        .run(async move {
            let _ = stop_rx.await;
        })
        .await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
