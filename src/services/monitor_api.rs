//! Trait for sources of real-time stop monitor responses.

use anyhow::Result;
use wl_departures::response::HttpResponse;

/// Abstraction over a monitor provider (e.g., Wiener Linien).
#[async_trait::async_trait]
pub trait MonitorApi {
    /// Fetches the monitor response covering `stops` (RBL numbers) in a
    /// single request. Non-200 responses are returned, not raised.
    async fn monitor(&self, stops: &[String]) -> Result<HttpResponse>;
}
