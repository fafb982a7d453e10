//! End-to-end dispatch tests: commands in, replies and broadcasts out

use async_trait::async_trait;
use ratecast::broadcast::BroadcastCoordinator;
use ratecast::dispatch::{
    Dispatcher, LoopState, REPLY_ALREADY_REGISTERED, REPLY_NOT_REGISTERED, REPLY_REGISTERED,
    REPLY_UNKNOWN, REPLY_UNREGISTERED,
};
use ratecast::rates::{Rate, RateSource};
use ratecast::store::{MemoryStore, SubscriberStore};
use ratecast::subscription::SubscriptionManager;
use ratecast::transport::{ChatId, CommandSpec, Inbound, Transport};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio_util::sync::CancellationToken;

struct FixedRates(Rate);

#[async_trait]
impl RateSource for FixedRates {
    async fn fetch(&self) -> anyhow::Result<Rate> {
        Ok(self.0)
    }
}

/// Transport fed from a test-held channel; records every outbound send
struct ScriptedTransport {
    inbound: Mutex<Option<mpsc::Receiver<Inbound>>>,
    sent: Mutex<Vec<(ChatId, String)>>,
    fail_for: Vec<ChatId>,
}

impl ScriptedTransport {
    fn new(inbound: mpsc::Receiver<Inbound>, fail_for: Vec<ChatId>) -> Self {
        Self {
            inbound: Mutex::new(Some(inbound)),
            sent: Mutex::new(Vec::new()),
            fail_for,
        }
    }

    async fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn updates(&self) -> anyhow::Result<mpsc::Receiver<Inbound>> {
        self.inbound
            .lock()
            .await
            .take()
            .ok_or_else(|| anyhow::anyhow!("updates already consumed"))
    }

    async fn send(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()> {
        if self.fail_for.contains(&chat_id) {
            anyhow::bail!("send rejected for {}", chat_id);
        }
        self.sent.lock().await.push((chat_id, text.to_string()));
        Ok(())
    }

    async fn set_commands(&self, _commands: &[CommandSpec]) -> anyhow::Result<()> {
        Ok(())
    }
}

struct Harness {
    tx: mpsc::Sender<Inbound>,
    transport: Arc<ScriptedTransport>,
    cancel: CancellationToken,
    state: watch::Receiver<LoopState>,
    handle: tokio::task::JoinHandle<()>,
}

impl Harness {
    async fn start(rate: Rate, seeded: &[ChatId], fail_for: Vec<ChatId>) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let transport = Arc::new(ScriptedTransport::new(rx, fail_for));

        let store = Arc::new(MemoryStore::new());
        for &chat_id in seeded {
            store.create(chat_id).await.unwrap();
        }

        let subscriptions = Arc::new(SubscriptionManager::new(store.clone()));
        let broadcasts = Arc::new(BroadcastCoordinator::new(
            store,
            Arc::new(FixedRates(rate)),
        ));

        let cancel = CancellationToken::new();
        let dispatcher = Arc::new(Dispatcher::new(
            transport.clone(),
            subscriptions,
            broadcasts,
            Duration::from_secs(3600),
            cancel.clone(),
        ));
        let state = dispatcher.state();

        let runner = dispatcher.clone();
        let handle = tokio::spawn(async move {
            runner.run().await.unwrap();
        });

        Self {
            tx,
            transport,
            cancel,
            state,
            handle,
        }
    }

    async fn say(&self, chat_id: ChatId, text: &str) {
        self.tx
            .send(Inbound {
                chat_id,
                text: text.to_string(),
            })
            .await
            .unwrap();
    }

    /// Poll the sent log until `cond` holds or the deadline passes
    async fn wait_for_sent<F>(&self, cond: F) -> Vec<(ChatId, String)>
    where
        F: Fn(&[(ChatId, String)]) -> bool,
    {
        for _ in 0..200 {
            let sent = self.transport.sent().await;
            if cond(&sent) {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out, sent so far: {:?}", self.transport.sent().await);
    }

    async fn shutdown(mut self) {
        self.cancel.cancel();
        tokio::time::timeout(
            Duration::from_secs(5),
            self.state.wait_for(|s| *s == LoopState::Stopped),
        )
        .await
        .expect("dispatcher did not stop")
        .unwrap();
        self.handle.await.unwrap();
    }
}

fn rate() -> Rate {
    Rate {
        buying: dec!(21.2222),
        selling: dec!(22.2222),
    }
}

#[tokio::test]
async fn test_startup_broadcast_reaches_every_subscriber_in_order() {
    let harness = Harness::start(rate(), &[101, 202, 303], vec![]).await;

    let sent = harness.wait_for_sent(|sent| sent.len() >= 3).await;

    let recipients: Vec<_> = sent.iter().map(|(chat_id, _)| *chat_id).collect();
    assert_eq!(recipients, vec![101, 202, 303]);
    for (_, text) in &sent {
        assert!(text.contains("22.2222"), "missing selling rate: {text}");
        assert!(text.contains("21.2222"), "missing buying rate: {text}");
    }

    harness.shutdown().await;
}

#[tokio::test]
async fn test_one_failed_send_does_not_stop_the_fan_out() {
    let harness = Harness::start(rate(), &[101, 202, 303], vec![202]).await;

    let sent = harness.wait_for_sent(|sent| sent.len() >= 2).await;
    let recipients: Vec<_> = sent.iter().map(|(chat_id, _)| *chat_id).collect();
    assert_eq!(recipients, vec![101, 303]);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_command_lifecycle_replies() {
    let harness = Harness::start(rate(), &[], vec![]).await;

    harness.say(555, "/register").await;
    let sent = harness.wait_for_sent(|sent| sent.len() == 1).await;
    assert_eq!(sent[0], (555, REPLY_REGISTERED.to_string()));

    harness.say(555, "/register").await;
    let sent = harness.wait_for_sent(|sent| sent.len() == 2).await;
    assert_eq!(sent[1], (555, REPLY_ALREADY_REGISTERED.to_string()));

    harness.say(555, "/delete").await;
    let sent = harness.wait_for_sent(|sent| sent.len() == 3).await;
    assert_eq!(sent[2], (555, REPLY_UNREGISTERED.to_string()));

    harness.say(555, "/delete").await;
    let sent = harness.wait_for_sent(|sent| sent.len() == 4).await;
    assert_eq!(sent[3], (555, REPLY_NOT_REGISTERED.to_string()));

    harness.shutdown().await;
}

#[tokio::test]
async fn test_unknown_command_gets_fixed_reply() {
    let harness = Harness::start(rate(), &[], vec![]).await;

    harness.say(9, "/start").await;
    let sent = harness.wait_for_sent(|sent| sent.len() == 1).await;
    assert_eq!(sent[0], (9, REPLY_UNKNOWN.to_string()));

    harness.shutdown().await;
}

#[tokio::test]
async fn test_chat_noise_is_discarded() {
    let harness = Harness::start(rate(), &[], vec![]).await;

    harness.say(7, "what is the rate?").await;
    harness.say(7, "/register").await;

    // Only the command produces a reply; the noise before it produces nothing.
    let sent = harness.wait_for_sent(|sent| sent.len() == 1).await;
    assert_eq!(sent[0], (7, REPLY_REGISTERED.to_string()));

    harness.shutdown().await;
}

#[tokio::test]
async fn test_cancellation_reaches_stopped_state() {
    let harness = Harness::start(rate(), &[], vec![]).await;
    assert_eq!(*harness.state.borrow(), LoopState::Running);

    harness.shutdown().await;
}
