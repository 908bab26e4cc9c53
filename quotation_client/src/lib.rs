//! Quotation client — asks the local quotation server for the current USD-BRL
//! quotation once, keeps only the bid and writes it to `cotacao.txt`.
//!
//! - `model` — the `BidQuote` projection of the server response.
//! - `request` — the deadline-bounded call to the server.
//! - `output` — the output file writer.
#![warn(missing_docs)]
pub mod model;
pub mod output;
pub mod request;

use std::path::Path;
use std::time::Duration;

use quotation_common::{QuotationError, Result};

/// Printed when the quotation could not be obtained.
pub const FETCH_FAILURE: &str = "Erro ao buscar cotacao!";
/// Printed when the output file could not be written.
pub const WRITE_FAILURE: &str = "Erro ao criar arquivo!";

/// Fetch the bid from `url` within `deadline` and write it to `output`.
///
/// The output file is only touched after the fetch succeeded.
pub async fn run(url: &str, output: &Path, deadline: Duration) -> Result<()> {
    let quote = request::fetch_bid(url, deadline).await?;
    output::write_bid(output, &quote)
}

/// Fixed message printed for `err`.
pub fn failure_message(err: &QuotationError) -> &'static str {
    match err {
        QuotationError::Io(_) => WRITE_FAILURE,
        _ => FETCH_FAILURE,
    }
}
