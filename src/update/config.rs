use anyhow::Result;
use reqwest::Client;

use crate::http::HttpClient;
use crate::portal::Portal;

/// Wiring for the real portal client.
pub struct Config {
    pub portal: Portal,
    pub http_client: HttpClient,
}

impl Config {
    pub fn new(portal_url: Option<String>) -> Result<Self> {
        let client = Client::builder().user_agent("jlink-update").build()?;
        let http_client = HttpClient::new(client);
        let portal = Portal::new(http_client.clone(), portal_url);

        Ok(Self {
            portal,
            http_client,
        })
    }
}
