pub mod http_source;

use async_trait::async_trait;
use serde::Deserialize;

use crate::app::Result;

pub use http_source::HttpNewsSource;

/// Wire shape of the top-headlines endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadlinesResponse {
    pub status: String,
    #[serde(rename = "totalResults")]
    pub total_results: u64,
    pub articles: Vec<ApiArticle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiArticle {
    pub source: ApiSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[async_trait]
pub trait NewsSource {
    async fn top_headlines(&self, country: &str) -> Result<HeadlinesResponse>;
}
