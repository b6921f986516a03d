pub mod edge;
pub mod edges;
pub mod init;
pub mod status;

use serde::Deserialize;

/// Default API endpoint of a local node.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Turn a non-success response into an error carrying the server's message.
pub(crate) async fn fail(action: &str, resp: reqwest::Response) -> anyhow::Error {
    let status = resp.status();
    match resp.json::<ErrorResponse>().await {
        Ok(err) => anyhow::anyhow!("{} failed (HTTP {}): {}", action, status, err.error),
        Err(_) => anyhow::anyhow!("{} failed (HTTP {})", action, status),
    }
}
