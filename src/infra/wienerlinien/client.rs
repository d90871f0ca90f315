use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;
use wl_departures::fetch::{BasicClient, HttpClient, fetch_response};
use wl_departures::response::HttpResponse;

use crate::services::monitor_api::MonitorApi;

/// Client for the Wiener Linien open-data realtime `monitor` endpoint.
pub struct WienerLinienClient<C = BasicClient> {
    base_url: String,
    http: C,
}

impl WienerLinienClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_http(base_url, BasicClient::new()?))
    }
}

impl<C: HttpClient> WienerLinienClient<C> {
    pub fn with_http(base_url: impl Into<String>, http: C) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// `{base_url}/monitor?rbl=..&rbl=..`, one `rbl` pair per stop.
    pub fn monitor_url(&self, stops: &[String]) -> Result<Url> {
        if stops.is_empty() {
            bail!("no stops configured for the monitor request");
        }

        let base = self.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/monitor"))
            .with_context(|| format!("invalid base URL '{}'", self.base_url))?;
        {
            let mut query = url.query_pairs_mut();
            for stop in stops {
                query.append_pair("rbl", stop);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl<C: HttpClient> MonitorApi for WienerLinienClient<C> {
    async fn monitor(&self, stops: &[String]) -> Result<HttpResponse> {
        let url = self.monitor_url(stops)?;
        debug!(url = %url, stops = stops.len(), "Requesting monitor");
        fetch_response(&self.http, url.as_str())
            .await
            .context("monitor request failed")
    }
}
