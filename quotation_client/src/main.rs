//! Quotation Client — calls the local quotation server once within 300ms and
//! writes `Dólar: <bid>` to `cotacao.txt` in the working directory.
//!
//! No flags. On failure a fixed message is printed, nothing is written and the
//! process still exits with status 0.
#![warn(missing_docs)]
use std::path::Path;

use log::error;
use quotation_client::output::OUTPUT_FILE;
use quotation_client::request::{CLIENT_DEADLINE, server_url};
use quotation_client::{failure_message, run};

#[tokio::main]
async fn main() {
    init_logger();

    let url = server_url();
    if let Err(e) = run(&url, Path::new(OUTPUT_FILE), CLIENT_DEADLINE).await {
        error!("Quotation from {} not written: {}", url, e);
        println!("{}", failure_message(&e));
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
