//! Quotation server binary.
//!
//! Wires the pieces from the library together:
//!
//! - parses `Args` (bind address, SQLite file, upstream URL);
//! - creates the `quotations` schema once at startup;
//! - serves `GET /cotacao` until the process is stopped.
//!
//! Each request opens its own storage connection; nothing is shared between
//! requests apart from the database file.
#![warn(missing_docs)]
use std::sync::Arc;

use clap::Parser;
use log::info;
use quotation_common::Result;
use quotation_server::config::Args;
use quotation_server::http::{QuotationServer, serve};
use quotation_server::store::SqliteStore;
use quotation_server::upstream::UpstreamClient;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let store = SqliteStore::new(&args.database);
    store.migrate().await?;
    info!("Storage ready at {}", store.path().display());

    let upstream = UpstreamClient::new(args.upstream_url);
    let server = QuotationServer::new(upstream, Arc::new(store));

    let listener = TcpListener::bind(&args.bind).await?;
    serve(listener, server).await
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
