pub mod sqlite;

use tokio::sync::watch;

use crate::app::Result;
use crate::domain::{Article, FavoriteArticle};

pub use sqlite::SqliteStore;

pub trait Store {
    // Article cache operations
    fn insert_articles(&self, articles: &[Article]) -> Result<()>;
    fn get_articles_by_country(&self, country: &str) -> Result<Vec<Article>>;
    fn get_article(&self, url: &str) -> Result<Option<Article>>;
    fn clear_articles(&self) -> Result<()>;

    // Favorite operations
    fn insert_favorite(&self, favorite: &FavoriteArticle) -> Result<()>;
    fn delete_favorite(&self, url: &str) -> Result<()>;
    fn get_favorites(&self) -> Result<Vec<FavoriteArticle>>;
    fn is_favorite(&self, url: &str) -> Result<bool>;

    /// Revision channel bumped after every mutation; live queries
    /// subscribe to it to know when to re-read.
    fn changes(&self) -> watch::Receiver<u64>;
}
