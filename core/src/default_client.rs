use reqwest::header::{HeaderMap, HeaderValue};

/// Originator reported in the user agent.
pub const DEFAULT_ORIGINATOR: &str = "taskpad_cli_rs";

pub fn get_user_agent(originator: &str) -> String {
    format!(
        "{originator}/{} ({} {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Builds the shared HTTP client. Timeouts are left at the transport default.
pub fn create_client(originator: &str) -> reqwest::Client {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(originator) {
        headers.insert("x-client-info", value);
    }

    reqwest::Client::builder()
        .user_agent(get_user_agent(originator))
        .default_headers(headers)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
}
