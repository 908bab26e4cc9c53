//!
//! Common types and utilities shared by the quotation server and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `QuotationError` used across the workspace.
//! - `result` — handy `Result<T, QuotationError>` alias.
//! - `quotation` — the wire-level `Quotation` exchanged over HTTP.
//! - `net` — endpoint constants and small URL helpers.
#![warn(missing_docs)]
pub mod error;
pub mod net;
pub mod quotation;
pub mod result;

pub use error::QuotationError;
pub use quotation::Quotation;
pub use result::Result;
