//! Bid-only view of the quotation returned by the server.
//!
//! The server answers with the full quotation; the client's contract is
//! narrower and keeps just `bid`. The projection is explicit: the body is read
//! as a JSON object, `bid` is extracted and the fields in `IGNORED_FIELDS` are
//! dropped on purpose.
use log::debug;
use quotation_common::{QuotationError, Result};
use serde_json::{Map, Value};

/// Wire fields present in the server response that the client discards.
pub const IGNORED_FIELDS: [&str; 10] = [
    "code",
    "codein",
    "name",
    "high",
    "low",
    "varBid",
    "pctChange",
    "ask",
    "timestamp",
    "create_date",
];

/// The only part of a quotation the client surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidQuote {
    /// Bid price, verbatim text.
    pub bid: String,
}

impl BidQuote {
    /// Project a server response body onto its `bid` field.
    ///
    /// Fails with `QuotationError::Decode` if the body is not a JSON object or
    /// has no textual `bid`.
    pub fn project(body: &[u8]) -> Result<Self> {
        let object: Map<String, Value> = serde_json::from_slice(body)?;
        let dropped = IGNORED_FIELDS
            .iter()
            .filter(|field| object.contains_key(**field))
            .count();
        debug!("Projecting quotation onto bid, dropping {} known fields", dropped);

        match object.get("bid") {
            Some(Value::String(bid)) => Ok(BidQuote { bid: bid.clone() }),
            Some(other) => Err(QuotationError::Decode(format!(
                "bid is not a string: {other}"
            ))),
            None => Err(QuotationError::Decode("bid field missing".to_string())),
        }
    }
}
