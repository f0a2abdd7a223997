use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::annotation::SqliteAnnotations;
use crate::dependable::DEPENDENTS_KEY;

/// Settings read from `dependable.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DependableConfig {
    /// SQLite annotation database, relative to the base directory
    pub database: Option<String>,
    /// Annotation key dependents are stored under
    pub annotation_key: Option<String>,
}

impl DependableConfig {
    pub fn database_path_in(&self, base: &Path) -> PathBuf {
        match &self.database {
            Some(database) => base.join(database),
            None => default_database_path_in(base),
        }
    }

    pub fn annotation_key(&self) -> &str {
        self.annotation_key.as_deref().unwrap_or(DEPENDENTS_KEY)
    }

    /// Open the configured annotation database, creating its directory
    pub fn open_store(&self, base: &Path) -> anyhow::Result<SqliteAnnotations> {
        let db_path = self.database_path_in(base);
        ensure_db_dir(&db_path)?;
        tracing::debug!("opening annotation store at {}", db_path.display());
        Ok(SqliteAnnotations::open(&db_path)?)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("dependable.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".dependable").join("annotations.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<DependableConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: DependableConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
