//! The repository: sole mediator between the remote news API, the local
//! article/favorite cache, and the preference store. Presentation code
//! never talks to those collaborators directly.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::app::Result;
use crate::domain::{Article, FavoriteArticle};
use crate::live::LiveQuery;
use crate::prefs::Preferences;
use crate::remote::{ApiArticle, NewsSource};
use crate::store::{SqliteStore, Store};

pub struct NewsRepository {
    store: Arc<SqliteStore>,
    source: Arc<dyn NewsSource + Send + Sync>,
    prefs: Arc<Preferences>,
}

impl NewsRepository {
    pub fn new(
        store: Arc<SqliteStore>,
        source: Arc<dyn NewsSource + Send + Sync>,
        prefs: Arc<Preferences>,
    ) -> Self {
        Self {
            store,
            source,
            prefs,
        }
    }

    /// Live view of the cached headlines for one country. Emits the
    /// current rows immediately, then again after every store change.
    pub fn watch_news(&self, country: &str) -> LiveQuery<Vec<Article>> {
        let store = self.store.clone();
        let country = country.to_string();
        LiveQuery::new(self.store.changes(), move || {
            store.get_articles_by_country(&country)
        })
    }

    /// Fetch top headlines for `country` and upsert them into the cache.
    ///
    /// Failures are masked: the caller gets an empty list whether the
    /// fetch failed or genuinely returned nothing, and the error is only
    /// logged. [`try_refresh_news`](Self::try_refresh_news) carries the
    /// distinction for callers inside this crate.
    pub async fn refresh_news(&self, country: &str) -> Vec<Article> {
        match self.try_refresh_news(country).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(country, error = %e, "failed to refresh news");
                Vec::new()
            }
        }
    }

    pub async fn try_refresh_news(&self, country: &str) -> Result<Vec<Article>> {
        let response = self.source.top_headlines(country).await?;

        let articles: Vec<Article> = response
            .articles
            .into_iter()
            .filter_map(|record| map_article(record, country))
            .collect();

        debug!(
            country,
            fetched = articles.len(),
            reported = response.total_results,
            "refreshed headlines"
        );

        self.store.insert_articles(&articles)?;
        Ok(articles)
    }

    pub fn watch_favorite_news(&self) -> LiveQuery<Vec<FavoriteArticle>> {
        let store = self.store.clone();
        LiveQuery::new(self.store.changes(), move || store.get_favorites())
    }

    /// Idempotent: favoriting an already-favorited URL replaces the row.
    pub fn add_favorite(&self, article: &Article) -> Result<()> {
        self.store.insert_favorite(&FavoriteArticle::from(article))
    }

    /// Idempotent: removing an absent favorite is a no-op.
    pub fn remove_favorite(&self, article: &Article) -> Result<()> {
        self.store.delete_favorite(&article.url)
    }

    /// Live existence check against the favorites table.
    pub fn watch_is_favorite(&self, url: &str) -> LiveQuery<bool> {
        let store = self.store.clone();
        let url = url.to_string();
        LiveQuery::new(self.store.changes(), move || store.is_favorite(&url))
    }

    /// Empties the article cache. Favorites are untouched.
    pub fn clear_all_news(&self) -> Result<()> {
        self.store.clear_articles()
    }

    pub fn get_cached_article(&self, url: &str) -> Result<Option<Article>> {
        self.store.get_article(url)
    }

    pub fn grid_layout(&self) -> watch::Receiver<bool> {
        self.prefs.grid_layout()
    }

    pub fn set_grid_layout(&self, is_grid: bool) -> Result<()> {
        self.prefs.set_grid_layout(is_grid)
    }
}

/// Map one API record to a cache row tagged with the country it was
/// fetched under. Records without a URL or title carry no identity or
/// headline and are dropped.
fn map_article(record: ApiArticle, country: &str) -> Option<Article> {
    Some(Article {
        url: record.url?,
        title: record.title?,
        description: record.description,
        author: record.author,
        source_name: record.source.name.unwrap_or_else(|| "Unknown".to_string()),
        url_to_image: record.url_to_image,
        published_at: record.published_at,
        content: record.content,
        country: country.to_string(),
    })
}
