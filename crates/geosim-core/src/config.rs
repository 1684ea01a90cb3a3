//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (nested keys separated by `__`, e.g.
//! `APP_SIMILARITY__POOL_LIMIT`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub const DEFAULT_DATA_ROOT: &str = "var/instance/data";
pub const DEFAULT_POOL_LIMIT: usize = 1000;
pub const DEFAULT_OUTPUT_SIZE: usize = 20;
pub const DEFAULT_TYPE_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub similarity: SimilaritySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Root under which file payloads live as `<aa>/<bb>/<rest>/data`.
    pub data_root: String,
}

impl Default for StorageSettings {
    fn default() -> Self { Self { data_root: DEFAULT_DATA_ROOT.to_string() } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilaritySettings {
    pub pool_limit: usize,
    pub default_size: usize,
    pub type_weight: f64,
}

impl Default for SimilaritySettings {
    fn default() -> Self {
        Self { pool_limit: DEFAULT_POOL_LIMIT, default_size: DEFAULT_OUTPUT_SIZE, type_weight: DEFAULT_TYPE_WEIGHT }
    }
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.similarity.pool_limit == 0 {
            return Err(Error::InvalidConfig("similarity.pool_limit must be greater than zero".into()));
        }
        if self.similarity.default_size == 0 {
            return Err(Error::InvalidConfig("similarity.default_size must be greater than zero".into()));
        }
        let w = self.similarity.type_weight;
        if !w.is_finite() || !(0.0..=1.0).contains(&w) {
            return Err(Error::InvalidConfig(format!("similarity.type_weight must be within 0.0-1.0, got {w}")));
        }
        if self.storage.data_root.trim().is_empty() {
            return Err(Error::InvalidConfig("storage.data_root must be non-empty".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
    settings: Settings,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> { Self::load_from(Path::new(".")) }

    /// Same as [`Config::load`], with the TOML files looked up in `dir`.
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let settings: Settings = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load settings ({}): {}", env_name, e))?;
        settings.validate()?;
        Ok(Self { figment, settings })
    }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
