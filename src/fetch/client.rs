use async_trait::async_trait;
use reqwest::{Method, Request, Response, Url};

/// Sends prepared HTTP requests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;

    async fn get(&self, url: Url) -> reqwest::Result<Response> {
        self.execute(Request::new(Method::GET, url)).await
    }
}
