use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{GazetteError, Result};
use crate::config::Config;
use crate::prefs::Preferences;
use crate::remote::{HttpNewsSource, NewsSource};
use crate::repository::NewsRepository;
use crate::store::SqliteStore;

/// Composition root. Collaborators are constructed in dependency order
/// (remote client, store, preferences, then the repository) and passed
/// explicitly; nothing is resolved through globals.
pub struct AppContext {
    pub repository: Arc<NewsRepository>,
    pub config: Config,
}

impl AppContext {
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_data_path("gazette.db")?,
        };

        let source: Arc<dyn NewsSource + Send + Sync> = Arc::new(HttpNewsSource::new(
            &config.base_url,
            config.api_key.clone(),
        )?);
        let store = Arc::new(SqliteStore::new(&db_path)?);
        let prefs = Arc::new(Preferences::open(Self::default_data_path("prefs.toml")?)?);
        let repository = Arc::new(NewsRepository::new(store, source, prefs));

        Ok(Self { repository, config })
    }

    /// Everything volatile: in-memory store and preferences. For tests.
    pub fn in_memory(config: Config) -> Result<Self> {
        let source: Arc<dyn NewsSource + Send + Sync> = Arc::new(HttpNewsSource::new(
            &config.base_url,
            config.api_key.clone(),
        )?);
        let store = Arc::new(SqliteStore::in_memory()?);
        let prefs = Arc::new(Preferences::in_memory());
        let repository = Arc::new(NewsRepository::new(store, source, prefs));

        Ok(Self { repository, config })
    }

    fn default_data_path(file: &str) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| GazetteError::Config("Could not find data directory".into()))?;
        let gazette_dir = data_dir.join("gazette");
        std::fs::create_dir_all(&gazette_dir)?;
        Ok(gazette_dir.join(file))
    }
}
