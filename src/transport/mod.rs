//! Messaging transport module
//!
//! Provides the inbound update stream and outbound sends

mod telegram;

pub use telegram::TelegramTransport;

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Stable handle identifying one subscriber's messaging destination
pub type ChatId = i64;

/// A single inbound text message from the transport
#[derive(Debug, Clone)]
pub struct Inbound {
    pub chat_id: ChatId,
    pub text: String,
}

/// A command name advertised to the transport at startup
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub command: &'static str,
    pub description: &'static str,
}

/// Trait for messaging transport implementations
#[async_trait]
pub trait Transport: Send + Sync {
    /// Subscribe to the inbound update stream
    ///
    /// The stream is lazy, unbounded and non-restartable; updates arrive in
    /// transport-delivery order.
    async fn updates(&self) -> anyhow::Result<mpsc::Receiver<Inbound>>;

    /// Send a text message to one destination
    async fn send(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()>;

    /// Advertise the recognized command names
    async fn set_commands(&self, commands: &[CommandSpec]) -> anyhow::Result<()>;
}
