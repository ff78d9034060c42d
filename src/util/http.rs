//! Shared HTTP client construction

use reqwest::Client;
use std::time::Duration;

/// Client used for the catalog, resolvers and downloads
///
/// APKMirror rejects requests without a user agent, so one is always set.
pub fn build_client(user_agent: &str, timeout: Option<Duration>) -> reqwest::Result<Client> {
    let mut builder = Client::builder().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
