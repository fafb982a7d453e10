//! Command classification and reply text

use crate::transport::{ChatId, CommandSpec};

pub const CMD_REGISTER: &str = "register";
pub const CMD_DELETE: &str = "delete";

pub const HELP_REGISTER: &str = "Register to receive hourly EUR→TRY updates";
pub const HELP_DELETE: &str = "Unregister from receiving updates";

/// Commands advertised to the transport at startup
pub const BOT_COMMANDS: [CommandSpec; 2] = [
    CommandSpec {
        command: CMD_REGISTER,
        description: HELP_REGISTER,
    },
    CommandSpec {
        command: CMD_DELETE,
        description: HELP_DELETE,
    },
];

pub const REPLY_REGISTERED: &str =
    "✅ You have been registered! You will receive hourly EUR→TRY updates.";
pub const REPLY_ALREADY_REGISTERED: &str = "You are already registered!";
pub const REPLY_UNREGISTERED: &str =
    "🗑️ You have been unregistered. You will no longer receive updates.";
pub const REPLY_NOT_REGISTERED: &str = "You are not registered!";
pub const REPLY_FAILURE: &str = "An unexpected error occurred. Please try again later.";
pub const REPLY_UNKNOWN: &str = "Unknown command. Use /register or /delete.";

/// Recognized command verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Register,
    Delete,
    Unknown,
}

/// One parsed command, alive for a single dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub chat_id: ChatId,
    pub verb: Verb,
}

impl Command {
    /// Classify one inbound message; `None` means chat noise, not a command
    pub fn parse(chat_id: ChatId, text: &str) -> Option<Self> {
        let first = text.trim().split_whitespace().next()?;
        let verb = first.strip_prefix('/')?;
        // Group chats address commands as /verb@botname.
        let verb = verb.split('@').next().unwrap_or(verb);

        let verb = match verb {
            CMD_REGISTER => Verb::Register,
            CMD_DELETE => Verb::Delete,
            _ => Verb::Unknown,
        };

        Some(Self { chat_id, verb })
    }
}
