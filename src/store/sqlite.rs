use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use rusqlite_migration::{Migrations, M};
use tokio::sync::watch;

use crate::app::{GazetteError, Result};
use crate::domain::{Article, FavoriteArticle};
use crate::live::Revision;
use crate::store::Store;

pub struct SqliteStore {
    conn: Mutex<Connection>,
    revision: Revision,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
            revision: Revision::new(),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
            revision: Revision::new(),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| GazetteError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            GazetteError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn article_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Article> {
        Ok(Article {
            url: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            author: row.get(3)?,
            source_name: row.get(4)?,
            url_to_image: row.get(5)?,
            published_at: row.get(6)?,
            content: row.get(7)?,
            country: row.get(8)?,
        })
    }

    fn favorite_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FavoriteArticle> {
        Ok(FavoriteArticle {
            url: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            author: row.get(3)?,
            source_name: row.get(4)?,
            url_to_image: row.get(5)?,
            published_at: row.get(6)?,
            content: row.get(7)?,
        })
    }
}

impl Store for SqliteStore {
    fn insert_articles(&self, articles: &[Article]) -> Result<()> {
        {
            let mut conn = self.lock()?;
            let tx = conn.transaction()?;

            for article in articles {
                tx.execute(
                    "INSERT OR REPLACE INTO articles
                     (url, title, description, author, source_name, url_to_image, published_at, content, country)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        article.url,
                        article.title,
                        article.description,
                        article.author,
                        article.source_name,
                        article.url_to_image,
                        article.published_at,
                        article.content,
                        article.country,
                    ],
                )?;
            }

            tx.commit()?;
        }

        self.revision.bump();
        Ok(())
    }

    fn get_articles_by_country(&self, country: &str) -> Result<Vec<Article>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT url, title, description, author, source_name, url_to_image, published_at, content, country
             FROM articles WHERE country = ?1",
        )?;

        let articles = stmt
            .query_map(params![country], Self::article_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(articles)
    }

    fn get_article(&self, url: &str) -> Result<Option<Article>> {
        use rusqlite::OptionalExtension;

        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT url, title, description, author, source_name, url_to_image, published_at, content, country
                 FROM articles WHERE url = ?1",
                params![url],
                Self::article_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn clear_articles(&self) -> Result<()> {
        {
            let conn = self.lock()?;
            conn.execute("DELETE FROM articles", [])?;
        }

        self.revision.bump();
        Ok(())
    }

    fn insert_favorite(&self, favorite: &FavoriteArticle) -> Result<()> {
        {
            let conn = self.lock()?;
            conn.execute(
                "INSERT OR REPLACE INTO favorites
                 (url, title, description, author, source_name, url_to_image, published_at, content)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    favorite.url,
                    favorite.title,
                    favorite.description,
                    favorite.author,
                    favorite.source_name,
                    favorite.url_to_image,
                    favorite.published_at,
                    favorite.content,
                ],
            )?;
        }

        self.revision.bump();
        Ok(())
    }

    fn delete_favorite(&self, url: &str) -> Result<()> {
        {
            let conn = self.lock()?;
            conn.execute("DELETE FROM favorites WHERE url = ?1", params![url])?;
        }

        self.revision.bump();
        Ok(())
    }

    fn get_favorites(&self) -> Result<Vec<FavoriteArticle>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT url, title, description, author, source_name, url_to_image, published_at, content
             FROM favorites",
        )?;

        let favorites = stmt
            .query_map([], Self::favorite_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(favorites)
    }

    fn is_favorite(&self, url: &str) -> Result<bool> {
        let conn = self.lock()?;

        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE url = ?1)",
            params![url],
            |row| row.get(0),
        )?;

        Ok(exists != 0)
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
