//! Deadline-bounded call to the quotation server.
use std::time::Duration;

use log::debug;
use quotation_common::net::{SERVER_PORT, quotation_url};
use quotation_common::{QuotationError, Result};
use reqwest::StatusCode;

use crate::model::bid::BidQuote;

/// Budget for the whole call: connect, response and body.
pub const CLIENT_DEADLINE: Duration = Duration::from_millis(300);

/// Endpoint of the local quotation server.
pub fn server_url() -> String {
    quotation_url("localhost", SERVER_PORT)
}

/// Whether the client treats `status` as a failed call.
///
/// Only statuses strictly greater than 200 are rejected, so anything at or
/// below 200 is accepted.
pub fn rejects_status(status: StatusCode) -> bool {
    status.as_u16() > 200
}

/// GET `url` once and project the body onto its bid, all within `deadline`.
///
/// Transport failures, an expired deadline and rejected statuses are
/// `QuotationError::Request`; a body without a textual bid is
/// `QuotationError::Decode`.
pub async fn fetch_bid(url: &str, deadline: Duration) -> Result<BidQuote> {
    let body = tokio::time::timeout(deadline, fetch_body(url))
        .await
        .map_err(|_| QuotationError::Request(QuotationError::deadline_message(deadline)))??;
    BidQuote::project(&body)
}

async fn fetch_body(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| QuotationError::Request(e.to_string()))?;
    let status = response.status();
    debug!("Server answered {}", status);
    if rejects_status(status) {
        return Err(QuotationError::Request(format!(
            "server answered with status {status}"
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| QuotationError::Request(e.to_string()))?;
    Ok(bytes.to_vec())
}
