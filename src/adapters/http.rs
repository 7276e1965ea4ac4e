use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

/// Shared client setup: every outbound call carries the user agent and a
/// bounded timeout.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .build()?;
    Ok(client)
}
