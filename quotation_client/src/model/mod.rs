//! Data model types received from the quotation server.
//!
//! - `bid` — the bid-only projection the client keeps from a quotation.
pub mod bid;
