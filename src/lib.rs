//! ratecast: subscription bot broadcasting EUR→TRY exchange rates
//!
//! This library provides the core components for:
//! - Command intake from the Telegram Bot API with per-command handler tasks
//! - Idempotent subscriber registration and removal
//! - Hourly rate broadcasts fanned out to every subscriber
//! - TCMB daily-rates feed client
//! - JSON-file-backed subscriber store
//! - Structured logging and counters

pub mod broadcast;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod rates;
pub mod store;
pub mod subscription;
pub mod telemetry;
pub mod transport;
