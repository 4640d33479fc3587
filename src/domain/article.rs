use serde::{Deserialize, Serialize};

/// A cached headline, scoped to the country it was fetched under.
///
/// Identity is the article URL; a refresh for a country overwrites
/// rows wholesale (replace-by-URL), never field-by-field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub source_name: String,
    pub url_to_image: Option<String>,
    /// Publication timestamp as reported by the API. Kept opaque.
    pub published_at: Option<String>,
    pub content: Option<String>,
    pub country: String,
}

impl Article {
    /// Case-insensitive substring match over title OR description.
    /// An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }

    pub fn display_author(&self) -> &str {
        self.author.as_deref().unwrap_or("Unknown")
    }

    pub fn display_description(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or("No description available")
    }

    pub fn display_content(&self) -> &str {
        self.content.as_deref().unwrap_or("No content available")
    }

    pub fn display_published_at(&self) -> &str {
        self.published_at.as_deref().unwrap_or("Unknown")
    }
}

/// A user-bookmarked article, independent of the headline cache.
///
/// Same descriptive fields as [`Article`] minus the country: a favorite
/// survives cache clears and country switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteArticle {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub source_name: String,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

impl From<&Article> for FavoriteArticle {
    fn from(article: &Article) -> Self {
        Self {
            url: article.url.clone(),
            title: article.title.clone(),
            description: article.description.clone(),
            author: article.author.clone(),
            source_name: article.source_name.clone(),
            url_to_image: article.url_to_image.clone(),
            published_at: article.published_at.clone(),
            content: article.content.clone(),
        }
    }
}
