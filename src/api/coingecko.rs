use crate::error::{Error, Result};
use crate::models::{Candle, PricePoint};
use chrono::{DateTime, Utc};
use log::error;
use reqwest::Client;
use std::collections::HashMap;

const API_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Raw `[ts_ms, open, high, low, close]` tuple of the OHLC endpoint.
type OhlcRow = (i64, f64, f64, f64, f64);

/// Client for the CoinGecko market-data API. One request per operation, no
/// retries, no caching; a failed attempt is surfaced to the caller as-is.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinGeckoClient {
    pub fn new() -> Self {
        Self::with_base_url(API_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Current EUR price from the simple-price endpoint.
    pub async fn get_simple_price(&self, api_id: &str) -> Result<PricePoint> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=eur",
            self.base_url, api_id
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let msg = format!("simple price request failed with status {}", response.status());
            error!("{}", msg);
            return Err(Error::Upstream(msg));
        }

        let body: HashMap<String, HashMap<String, f64>> = response.json().await?;
        let price_eur = body
            .get(api_id)
            .and_then(|quotes| quotes.get("eur"))
            .copied()
            .ok_or_else(|| {
                Error::Upstream(format!("no EUR quote for {} in simple price response", api_id))
            })?;

        Ok(PricePoint {
            coin_id: api_id.to_string(),
            price_eur,
        })
    }

    /// Historical OHLC series for the given lookback window, ordered by
    /// timestamp ascending with duplicate timestamps dropped. An empty
    /// upstream array is a valid "no data" outcome, not an error.
    pub async fn get_ohlc(&self, api_id: &str, days: u32) -> Result<Vec<Candle>> {
        let url = format!(
            "{}/coins/{}/ohlc?vs_currency=eur&days={}",
            self.base_url, api_id, days
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let msg = format!("OHLC request failed with status {}", response.status());
            error!("{}", msg);
            return Err(Error::Upstream(msg));
        }

        let rows: Vec<OhlcRow> = response.json().await?;
        let mut candles: Vec<Candle> = rows
            .into_iter()
            .map(|(ts_ms, open, high, low, close)| Candle {
                timestamp: DateTime::<Utc>::from_timestamp_millis(ts_ms).unwrap_or_else(Utc::now),
                open,
                high,
                low,
                close,
            })
            .collect();
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);

        Ok(candles)
    }
}
