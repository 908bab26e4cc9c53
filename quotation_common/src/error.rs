//! Error types shared between client and server.
//!
//! Every stage of the quotation chain fails with its own variant, so the
//! boundary that handles the error can tell an upstream problem from a storage
//! problem without inspecting messages.
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum QuotationError {
    /// Outbound call to the upstream provider could not complete
    /// (connection, DNS, body read or deadline).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was not valid JSON of the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Storage connection, schema or insert failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Client-side call to the quotation server failed or was rejected.
    #[error("Request error: {0}")]
    Request(String),

    /// Local I/O failure (output file, listener socket).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl QuotationError {
    /// Message used when an operation outlives its deadline.
    pub fn deadline_message(budget: Duration) -> String {
        format!("deadline of {}ms exceeded", budget.as_millis())
    }
}

impl From<serde_json::Error> for QuotationError {
    fn from(err: serde_json::Error) -> Self {
        QuotationError::Decode(err.to_string())
    }
}
