use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use super::page::PortalPage;
use crate::http::HttpClient;

/// SEGGER's public J-Link download portal.
pub const SEGGER_PORTAL_URL: &str = "https://www.segger.com/downloads/jlink/";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FetchPortal: Send + Sync {
    /// Fetch the portal's download page.
    async fn fetch(&self) -> Result<PortalPage>;

    /// Base URL package files are served from.
    fn base_url(&self) -> &str;
}

pub struct Portal {
    http: HttpClient,
    base_url: String,
}

impl Portal {
    #[tracing::instrument(skip(http, base_url))]
    pub fn new(http: HttpClient, base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| SEGGER_PORTAL_URL.to_string());
        Self { http, base_url }
    }
}

#[async_trait]
impl FetchPortal for Portal {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self) -> Result<PortalPage> {
        debug!("Fetching download page from {}...", self.base_url);
        let html = self.http.get_text(&self.base_url).await?;
        Ok(PortalPage::new(html))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;

    #[test]
    fn test_default_base_url() {
        let portal = Portal::new(HttpClient::new(Client::new()), None);
        assert_eq!(portal.base_url(), SEGGER_PORTAL_URL);
    }

    #[tokio::test]
    async fn test_fetch_parses_page() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(
                r#"<select class="version"><option value="0">V8.10g</option></select>"#,
            )
            .create_async()
            .await;

        let portal = Portal::new(HttpClient::new(Client::new()), Some(url));
        let page = portal.fetch().await.unwrap();

        mock.assert_async().await;
        let versions = page.versions().unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].name, "V8.10g");
    }

    #[tokio::test]
    async fn test_fetch_propagates_http_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/")
            .with_status(404)
            .create_async()
            .await;

        let portal = Portal::new(HttpClient::new(Client::new()), Some(url));
        assert!(portal.fetch().await.is_err());
    }
}
