//! Configuration for the folio content cache.
//!
//! Values are layered with [`figment`]: built-in defaults, then an optional
//! file (TOML, YAML or JSON, picked by extension), then `FOLIO_`-prefixed
//! environment variables. Nested keys use a double underscore, e.g.
//! `FOLIO_LIMITS__BATCH_SIZE=50` or `FOLIO_SETTINGS__SHOW_TAGS=false`.

pub mod error;
mod limits;
mod settings;

pub use crate::limits::{DEFAULT_BATCH_SIZE, DEFAULT_DEBOUNCE_MS, DEFAULT_PARALLEL_LIMIT, Limits};
pub use crate::settings::{ChangedInputs, Settings};

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

const ENV_PREFIX: &str = "FOLIO_";
const DATABASE_FILENAME: &str = "content.sqlite";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the content cache database. Defaults to the platform
    /// cache directory, see [`Config::database_path`].
    pub database: Option<PathBuf>,
    pub settings: Settings,
    pub limits: Limits,
}

impl Config {
    /// Load configuration from defaults, an optional file, and the environment.
    #[instrument(skip_all)]
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            let path = path.as_ref();
            tracing::debug!(path = %path.display(), "merging configuration file");
            figment = Self::merge_file(figment, path)?;
        }
        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .or_raise(|| ErrorKind::Load)?;
        let limits = config.limits.validate()?;
        tracing::debug!(?limits, "configuration loaded");
        Ok(Self { limits, ..config })
    }

    fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
        let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        Ok(match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file_exact(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
            Some("json") => figment.merge(Json::file_exact(path)),
            _ => {
                exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf()));
            },
        })
    }

    /// The configured database path, or `<platform cache dir>/content.sqlite`.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => Self::default_database_path(),
        }
    }

    pub fn default_database_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "folio").ok_or_raise(|| ErrorKind::NoCacheDirectory)?;
        Ok(dirs.cache_dir().join(DATABASE_FILENAME))
    }
}
