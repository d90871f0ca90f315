mod client;
mod basic;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::{Context, Result};
use tracing::debug;

use crate::response::HttpResponse;

/// Performs a GET and captures the status and body without judging either.
///
/// Only transport failures are errors here; status handling belongs to
/// [`crate::validate::validate`].
pub async fn fetch_response<C: HttpClient>(client: &C, url: &str) -> Result<HttpResponse> {
    let url: reqwest::Url = url.parse().with_context(|| format!("invalid URL '{url}'"))?;

    let resp = client.get(url).await?;
    let status = resp.status().as_u16();
    let body = resp.bytes().await?.to_vec();
    debug!(status, bytes = body.len(), "Response received");

    Ok(HttpResponse::new(status, body))
}
