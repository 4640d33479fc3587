//! Durable scalar preferences.
//!
//! A single TOML file holding the grid-layout flag. Writes go to disk and
//! to a watch channel, so readers see changes live; reopening the file
//! from the same path after a restart yields the last persisted value.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::app::{GazetteError, Result};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct PrefValues {
    grid_layout: bool,
}

pub struct Preferences {
    path: Option<PathBuf>,
    state: watch::Sender<bool>,
}

impl Preferences {
    /// Open (or initialize) the preference file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)
                .map_err(|e| GazetteError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            PrefValues::default()
        };

        let (state, _rx) = watch::channel(values.grid_layout);
        Ok(Self {
            path: Some(path),
            state,
        })
    }

    /// Volatile store for tests: same live semantics, nothing on disk.
    pub fn in_memory() -> Self {
        let (state, _rx) = watch::channel(false);
        Self { path: None, state }
    }

    /// Live view of the grid-layout flag. The receiver holds the current
    /// value immediately and observes every later write.
    pub fn grid_layout(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    pub fn set_grid_layout(&self, is_grid: bool) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = toml::to_string(&PrefValues {
                grid_layout: is_grid,
            })
            .map_err(|e| GazetteError::Config(e.to_string()))?;
            fs::write(path, content)?;
        }

        self.state.send_replace(is_grid);
        Ok(())
    }
}
