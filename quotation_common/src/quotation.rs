//! Wire-level quotation shared by the server response and the upstream payload.
//!
//! Every field is textual: the upstream provider emits numbers as strings and
//! they are kept verbatim, never parsed.
use serde::{Deserialize, Serialize};

/// Snapshot of a currency pair as reported by the upstream provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotation {
    /// Currency code, e.g. `USD`.
    pub code: String,
    /// Base currency code, e.g. `BRL`.
    #[serde(rename = "codein")]
    pub base_code: String,
    /// Human readable pair name.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Highest price of the day.
    pub high: String,
    /// Lowest price of the day.
    pub low: String,
    /// Absolute bid variation.
    #[serde(rename = "varBid")]
    pub variation: String,
    /// Percent change.
    #[serde(rename = "pctChange")]
    pub percent_change: String,
    /// Bid price.
    pub bid: String,
    /// Ask price.
    pub ask: String,
    /// Unix timestamp of the quote, as text.
    pub timestamp: String,
    /// Provider creation date, as text.
    pub create_date: String,
}
