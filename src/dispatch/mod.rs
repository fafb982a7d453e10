//! Dispatch loop
//!
//! The concurrency core: consumes the inbound update stream, spawning one
//! handler task per recognized command, while an independent timer task drives
//! the periodic broadcast. One cancellation token stops both loops.

mod command;

pub use command::{Command, Verb, BOT_COMMANDS, CMD_DELETE, CMD_REGISTER};
pub use command::{
    REPLY_ALREADY_REGISTERED, REPLY_FAILURE, REPLY_NOT_REGISTERED, REPLY_REGISTERED,
    REPLY_UNKNOWN, REPLY_UNREGISTERED,
};

use crate::broadcast::{render_message, BroadcastCoordinator};
use crate::subscription::{SubscriptionError, SubscriptionManager};
use crate::telemetry::{increment_counter, Counter};
use crate::transport::{Inbound, Transport};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Process-lifetime state of the dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    ShuttingDown,
    Stopped,
}

/// Serves commands and drives broadcasts until cancelled
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    subscriptions: Arc<SubscriptionManager>,
    broadcasts: Arc<BroadcastCoordinator>,
    period: Duration,
    cancel: CancellationToken,
    state_tx: watch::Sender<LoopState>,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        subscriptions: Arc<SubscriptionManager>,
        broadcasts: Arc<BroadcastCoordinator>,
        period: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (state_tx, _) = watch::channel(LoopState::Running);
        Self {
            transport,
            subscriptions,
            broadcasts,
            period,
            cancel,
            state_tx,
        }
    }

    /// Observe the loop state transitions
    pub fn state(&self) -> watch::Receiver<LoopState> {
        self.state_tx.subscribe()
    }

    /// Run the intake loop and the timer loop until cancellation
    ///
    /// Returns once both loops have exited. Handler tasks spawned for
    /// in-flight commands are not awaited here; the caller grants them a
    /// short drain period before process exit.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut updates = self.transport.updates().await?;

        let timer = {
            let transport = Arc::clone(&self.transport);
            let broadcasts = Arc::clone(&self.broadcasts);
            let cancel = self.cancel.clone();
            let period = self.period;
            tokio::spawn(async move {
                broadcast_loop(transport, broadcasts, period, cancel).await;
            })
        };

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Dispatcher stopping on cancellation");
                    break;
                }
                maybe = updates.recv() => match maybe {
                    Some(inbound) => self.dispatch(inbound),
                    None => {
                        tracing::warn!("Update stream closed, shutting down");
                        self.cancel.cancel();
                        break;
                    }
                },
            }
        }

        self.state_tx.send_replace(LoopState::ShuttingDown);
        let _ = timer.await;
        self.state_tx.send_replace(LoopState::Stopped);

        Ok(())
    }

    /// Classify one inbound message and hand it to its own handler task
    fn dispatch(&self, inbound: Inbound) {
        // Chat noise never spawns a handler task.
        let Some(command) = Command::parse(inbound.chat_id, &inbound.text) else {
            return;
        };

        tracing::info!(chat_id = command.chat_id, verb = ?command.verb, "Command received");
        increment_counter(Counter::CommandsReceived);

        let transport = Arc::clone(&self.transport);
        let subscriptions = Arc::clone(&self.subscriptions);
        tokio::spawn(async move {
            handle_command(transport, subscriptions, command).await;
        });
    }
}

async fn handle_command(
    transport: Arc<dyn Transport>,
    subscriptions: Arc<SubscriptionManager>,
    command: Command,
) {
    let reply = match command.verb {
        Verb::Register => match subscriptions.register(command.chat_id).await {
            Ok(()) => REPLY_REGISTERED,
            Err(SubscriptionError::AlreadyRegistered) => REPLY_ALREADY_REGISTERED,
            Err(_) => REPLY_FAILURE,
        },
        Verb::Delete => match subscriptions.unregister(command.chat_id).await {
            Ok(()) => REPLY_UNREGISTERED,
            Err(SubscriptionError::NotRegistered) => REPLY_NOT_REGISTERED,
            Err(_) => REPLY_FAILURE,
        },
        Verb::Unknown => REPLY_UNKNOWN,
    };

    if let Err(e) = transport.send(command.chat_id, reply).await {
        increment_counter(Counter::ReplyFailures);
        tracing::warn!(chat_id = command.chat_id, error = %e, "Reply send failed");
    }
}

async fn broadcast_loop(
    transport: Arc<dyn Transport>,
    broadcasts: Arc<BroadcastCoordinator>,
    period: Duration,
    cancel: CancellationToken,
) {
    // The first tick completes immediately, so one broadcast goes out at
    // startup instead of after a full period.
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Broadcast loop stopping on cancellation");
                return;
            }
            _ = ticker.tick() => broadcast_once(transport.as_ref(), &broadcasts).await,
        }
    }
}

/// Run one broadcast tick: prepare, render, fan out
///
/// Any preparation failure skips the tick. A failed send to one recipient is
/// logged and does not abort the remaining recipients.
pub async fn broadcast_once(transport: &dyn Transport, broadcasts: &BroadcastCoordinator) {
    tracing::info!("Broadcast tick");

    let prepared = match broadcasts.prepare().await {
        Ok(broadcast) => broadcast,
        Err(e) => {
            increment_counter(Counter::BroadcastsSkipped);
            tracing::warn!(error = %e, "Skipping broadcast tick");
            return;
        }
    };

    if prepared.recipients.is_empty() {
        return;
    }

    let text = render_message(&prepared.rate, Local::now());

    let mut delivered = 0usize;
    for &chat_id in &prepared.recipients {
        match transport.send(chat_id, &text).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                increment_counter(Counter::NotifyFailures);
                tracing::warn!(chat_id, error = %e, "Notification send failed");
            }
        }
    }

    increment_counter(Counter::BroadcastsCompleted);
    tracing::info!(
        delivered,
        recipients = prepared.recipients.len(),
        "Broadcast complete"
    );
}
