//! Exchange rate module
//!
//! Provides the point-in-time EUR→TRY rate snapshot

mod tcmb;

pub use tcmb::TcmbClient;

use async_trait::async_trait;
use rust_decimal::Decimal;

/// A point-in-time rate snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    pub buying: Decimal,
    pub selling: Decimal,
}

/// Trait for rate source implementations
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the current rate
    async fn fetch(&self) -> anyhow::Result<Rate>;
}
