//! Quotation HTTP server.
//!
//! Serves `GET /cotacao`: each call fetches the USD-BRL quotation from the
//! upstream provider under one deadline, stores it under a second, shorter
//! deadline and answers with the quotation. The building blocks are:
//!
//! - `config` — command line arguments and the per-stage deadlines.
//! - `upstream` — single-attempt fetch from the upstream provider.
//! - `store` — `QuotationStore` seam and its SQLite implementation.
//! - `http` — axum router and the request handler orchestrating the chain.
#![warn(missing_docs)]
pub mod config;
pub mod http;
pub mod store;
pub mod upstream;
