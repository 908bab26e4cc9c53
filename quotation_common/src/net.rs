//! Shared networking constants and helpers used by client and server.

/// TCP port the quotation server listens on.
pub const SERVER_PORT: u16 = 8080;
/// Path of the only endpoint exposed by the server.
pub const QUOTATION_PATH: &str = "/cotacao";

/// Helper to format an address with a port like "host:port".
pub fn addr(host: &str, port: u16) -> String {
    format!("{}:{}", host, port)
}

/// Full URL of the quotation endpoint on `host:port`.
pub fn quotation_url(host: &str, port: u16) -> String {
    format!("http://{}{}", addr(host, port), QUOTATION_PATH)
}
