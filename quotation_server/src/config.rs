//! Command-line arguments and deadlines for the quotation server.
use std::time::Duration;

use clap::Parser;
use quotation_common::net::{SERVER_PORT, addr};

use crate::upstream::UPSTREAM_URL;

/// Budget for the upstream fetch, including reading the body.
pub const FETCH_DEADLINE: Duration = Duration::from_millis(200);
/// Budget for opening a storage connection and inserting one record.
pub const PERSIST_DEADLINE: Duration = Duration::from_millis(10);
/// Default SQLite database file.
pub const DEFAULT_DATABASE: &str = "quotation.sqlite";

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address the HTTP listener binds to.
    #[clap(long, default_value_t = addr("0.0.0.0", SERVER_PORT))]
    pub bind: String,

    /// Path of the SQLite database file. Created if missing.
    #[clap(long, default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Upstream provider URL returning `{"USDBRL": {...}}`.
    #[clap(long, default_value = UPSTREAM_URL)]
    pub upstream_url: String,
}

/// Independent per-stage budgets applied by the request handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    /// Upstream fetch budget.
    pub fetch: Duration,
    /// Persistence write budget.
    pub persist: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            fetch: FETCH_DEADLINE,
            persist: PERSIST_DEADLINE,
        }
    }
}
