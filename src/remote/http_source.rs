use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::app::{GazetteError, Result};
use crate::remote::{HeadlinesResponse, NewsSource};

pub struct HttpNewsSource {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpNewsSource {
    pub fn new(base_url: &str, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .user_agent("gazette/0.1.0")
            .build()
            .map_err(GazetteError::Http)?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            api_key,
        })
    }
}

#[async_trait]
impl NewsSource for HttpNewsSource {
    async fn top_headlines(&self, country: &str) -> Result<HeadlinesResponse> {
        let mut url = self.base_url.join("v2/top-headlines")?;
        url.query_pairs_mut()
            .append_pair("country", country)
            .append_pair("apiKey", &self.api_key);

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let body: HeadlinesResponse = response.json().await?;

        if body.status != "ok" {
            return Err(GazetteError::Api(body.status));
        }

        Ok(body)
    }
}
