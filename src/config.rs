use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::import::DEFAULT_BATCH_SIZE;
use crate::{Error, Result};

/// Optional settings read from `orunmila.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OrunmilaConfig {
    pub database: Option<String>,
    pub batch_size: Option<usize>,
}

/// Settings every command runs with, after CLI flags and config are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: PathBuf,
    pub batch_size: usize,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("orunmila.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join("orunmila.db")
}

/// Load the config file; a missing file is not an error.
pub fn load_config(path: Option<&Path>) -> Result<Option<OrunmilaConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: OrunmilaConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

impl Settings {
    /// Merge, in order of precedence: CLI flags, config file, defaults
    /// relative to `cwd`.
    pub fn resolve(
        cli_database: Option<PathBuf>,
        cli_batch_size: Option<usize>,
        config: Option<&OrunmilaConfig>,
        cwd: &Path,
    ) -> Result<Self> {
        let database = cli_database
            .or_else(|| config.and_then(|c| c.database.as_ref()).map(PathBuf::from))
            .unwrap_or_else(|| default_database_path_in(cwd));

        let batch_size = cli_batch_size
            .or_else(|| config.and_then(|c| c.batch_size))
            .unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(Error::Config("batch_size must be greater than zero".to_string()));
        }

        Ok(Self { database, batch_size })
    }
}
