//! Token price lookup

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ActionError;

/// Spot price of a token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    /// Token as requested
    pub token: String,
    /// Quote currency
    pub currency: String,
    /// Price in `currency`
    pub price: f64,
}

/// Source of token prices, injected into the action context
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Price of `token` in `currency`
    async fn price(&self, token: &str, currency: &str) -> Result<PriceQuote, ActionError>;
}

/// Map common ticker symbols to CoinGecko coin ids
fn coin_id(token: &str) -> String {
    let lower = token.trim().to_ascii_lowercase();
    match lower.as_str() {
        "btc" => "bitcoin",
        "eth" => "ethereum",
        "stt" | "somi" => "somnia",
        "usdc" => "usd-coin",
        "usdt" => "tether",
        "sol" => "solana",
        "bnb" => "binancecoin",
        "matic" | "pol" => "matic-network",
        other => other,
    }
    .to_string()
}

/// CoinGecko-style `simple/price` client
pub struct HttpPriceSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPriceSource {
    /// Create a client for `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ActionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ActionError::Network {
                reason: e.to_string(),
                code: None,
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn price(&self, token: &str, currency: &str) -> Result<PriceQuote, ActionError> {
        let id = coin_id(token);
        let currency = currency.to_ascii_lowercase();
        let url = format!("{}/simple/price", self.base_url);
        debug!(%url, %id, %currency, "price lookup");

        let network = |e: reqwest::Error| ActionError::Network {
            reason: e.to_string(),
            code: e.status().map(|s| s.as_u16() as i64),
        };
        let body: Value = self
            .client
            .get(&url)
            .query(&[("ids", id.as_str()), ("vs_currencies", currency.as_str())])
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?
            .json()
            .await
            .map_err(network)?;

        let price = body
            .get(&id)
            .and_then(|quotes| quotes.get(&currency))
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                ActionError::InvalidInput(format!("no {} price for {}", currency, token))
            })?;

        Ok(PriceQuote {
            token: token.to_string(),
            currency,
            price,
        })
    }
}

/// Fixed price table
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    prices: HashMap<String, f64>,
}

impl StaticPriceSource {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a price, in any currency
    pub fn with_price(mut self, token: &str, price: f64) -> Self {
        self.prices.insert(coin_id(token), price);
        self
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn price(&self, token: &str, currency: &str) -> Result<PriceQuote, ActionError> {
        let price = self.prices.get(&coin_id(token)).copied().ok_or_else(|| {
            ActionError::InvalidInput(format!("no {} price for {}", currency, token))
        })?;
        Ok(PriceQuote {
            token: token.to_string(),
            currency: currency.to_ascii_lowercase(),
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_id() {
        assert_eq!(coin_id("ETH"), "ethereum");
        assert_eq!(coin_id(" btc "), "bitcoin");
        assert_eq!(coin_id("somnia"), "somnia");
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticPriceSource::new().with_price("eth", 3000.5);
        let quote = source.price("ETH", "USD").await.unwrap();
        assert_eq!(quote.price, 3000.5);
        assert_eq!(quote.currency, "usd");
        assert!(matches!(
            source.price("doge", "usd").await,
            Err(ActionError::InvalidInput(_))
        ));
    }
}
