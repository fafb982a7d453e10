//! Run command implementation

use crate::broadcast::BroadcastCoordinator;
use crate::config::Config;
use crate::dispatch::{Dispatcher, BOT_COMMANDS};
use crate::rates::TcmbClient;
use crate::store::FileStore;
use crate::subscription::SubscriptionManager;
use crate::transport::{TelegramTransport, Transport};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How long already-dispatched handler tasks get to finish after the loops stop
const DRAIN_PERIOD: Duration = Duration::from_secs(1);

#[derive(Args, Debug)]
pub struct RunArgs {}

impl RunArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let store = Arc::new(FileStore::open(&config.store.path).await?);
        let rates = Arc::new(TcmbClient::new(&config.rates));
        let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(&config.transport));

        transport.set_commands(&BOT_COMMANDS).await?;

        let subscriptions = Arc::new(SubscriptionManager::new(store.clone()));
        let broadcasts = Arc::new(BroadcastCoordinator::new(store, rates));

        let cancel = CancellationToken::new();
        spawn_signal_handler(cancel.clone());

        let dispatcher = Dispatcher::new(
            transport,
            subscriptions,
            broadcasts,
            Duration::from_secs(config.broadcast.interval_secs),
            cancel,
        );

        tracing::info!("Bot is running");
        dispatcher.run().await?;

        tracing::info!("Draining in-flight handlers");
        tokio::time::sleep(DRAIN_PERIOD).await;
        tracing::info!("Shutdown complete");

        Ok(())
    }
}

/// Cancel the token on SIGINT or SIGTERM
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {},
                _ = sigterm.recv() => {},
            }
        }
        #[cfg(not(unix))]
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl+c");

        tracing::info!("Received shutdown signal, draining");
        cancel.cancel();
    });
}
