//! Upstream CSV download.
//!
//! One GET, whole body as text. No retry, no timeout, no caching: a failed
//! request fails the load.

use reqwest::Client;

use crate::api::logs::{log_info, log_success};
use crate::error::{FetchError, FetchResult};

const USER_AGENT: &str = concat!("hospit/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client used for upstream requests.
pub fn http_client() -> FetchResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(FetchError::Client)
}

/// Fetch `url` and return the response body as text.
pub async fn fetch_csv(client: &Client, url: &str) -> FetchResult<String> {
    log_info(format!("📡 Fetching {}", url));

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.text().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })?;

    log_success(format!("Received {} bytes", body.len()));
    Ok(body)
}
