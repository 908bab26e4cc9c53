//! Output file writer.
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use log::warn;
use quotation_common::Result;

use crate::model::bid::BidQuote;

/// Output file written in the working directory.
pub const OUTPUT_FILE: &str = "cotacao.txt";
/// Prefix preceding the bid in the output line.
pub const LINE_PREFIX: &str = "Dólar: ";

/// Output line for `quote`, without trailing newline.
pub fn render(quote: &BidQuote) -> String {
    format!("{}{}", LINE_PREFIX, quote.bid)
}

/// Create (or truncate) `path` and write the bid line to it.
///
/// A file left incomplete by a failed write is removed before the error is
/// returned.
pub fn write_bid(path: &Path, quote: &BidQuote) -> Result<()> {
    let mut file = File::create(path)?;
    if let Err(e) = file.write_all(render(quote).as_bytes()) {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path) {
            warn!("Failed to remove incomplete {}: {}", path.display(), remove_err);
        }
        return Err(e.into());
    }
    Ok(())
}
