//! TCMB daily rates feed client
//!
//! Fetches the central bank's daily XML feed and extracts the forex
//! buying/selling pair for one currency.

use super::{Rate, RateSource};
use crate::config::RatesConfig;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// One day of rates as published by TCMB
#[derive(Debug, Deserialize)]
struct TcmbDaily {
    #[serde(rename = "Currency", default)]
    currencies: Vec<TcmbCurrency>,
}

#[derive(Debug, Deserialize)]
struct TcmbCurrency {
    #[serde(rename = "CurrencyName", default)]
    currency_name: String,
    #[serde(rename = "ForexBuying")]
    forex_buying: Option<String>,
    #[serde(rename = "ForexSelling")]
    forex_selling: Option<String>,
}

/// Client for the TCMB daily rates feed
pub struct TcmbClient {
    client: Client,
    url: String,
    currency: String,
}

impl TcmbClient {
    /// Create a new feed client
    pub fn new(config: &RatesConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url: config.url.clone(),
            currency: config.currency.clone(),
        }
    }

    /// Extract the configured currency's rate from a feed document
    fn parse_rate(body: &str, currency: &str) -> anyhow::Result<Rate> {
        let daily: TcmbDaily = quick_xml::de::from_str(body)
            .map_err(|e| anyhow::anyhow!("parse XML: {}", e))?;

        let entry = daily
            .currencies
            .into_iter()
            .find(|c| c.currency_name == currency)
            .ok_or_else(|| anyhow::anyhow!("{} not found in feed", currency))?;

        let buying = Self::parse_value(entry.forex_buying.as_deref(), currency, "ForexBuying")?;
        let selling = Self::parse_value(entry.forex_selling.as_deref(), currency, "ForexSelling")?;

        Ok(Rate { buying, selling })
    }

    fn parse_value(raw: Option<&str>, currency: &str, field: &str) -> anyhow::Result<Decimal> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
            anyhow::anyhow!("{} missing {} value", currency, field)
        })?;
        Decimal::from_str(raw).map_err(|e| anyhow::anyhow!("{} {}: {}", currency, field, e))
    }
}

#[async_trait]
impl RateSource for TcmbClient {
    async fn fetch(&self) -> anyhow::Result<Rate> {
        tracing::debug!(url = %self.url, "Fetching daily rates feed");

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("unexpected status: {}", response.status());
        }

        let body = response.text().await?;
        Self::parse_rate(&body, &self.currency)
    }
}
