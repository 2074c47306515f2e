use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current price of one coin in EUR. Built per request, dropped after the
/// reply is sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub coin_id: String,
    pub price_eur: f64,
}

/// One OHLC interval of the historical series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}
