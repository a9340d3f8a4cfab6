use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::Duration,
};

pub const ENV_DB_PATH: &str = "LETTERBOX_DB_PATH";
pub const ENV_REDIRECT_DELAY_MS: &str = "LETTERBOX_REDIRECT_DELAY_MS";
pub const ENV_DEBUG: &str = "LETTERBOX_DEBUG";

const DEFAULT_DB_FILE: &str = "letterbox.sqlite3";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    /// Pause between the "letter sent" confirmation and the redirect back to
    /// the letter box.
    pub redirect_delay_ms: u64,
    pub browse_limit: usize,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_FILE),
            redirect_delay_ms: 2_000,
            browse_limit: 20,
            debug: false,
        }
    }
}

impl AppConfig {
    /// Defaults with the database placed inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            database_path: data_dir.join(DEFAULT_DB_FILE),
            ..Self::default()
        }
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    /// Applies `LETTERBOX_*` overrides from the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|value| !value.is_empty()) {
            self.database_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(ENV_REDIRECT_DELAY_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.redirect_delay_ms = ms,
                Err(err) => warn!("Ignoring {ENV_REDIRECT_DELAY_MS}={raw:?}: {err}"),
            }
        }

        if let Some(raw) = lookup(ENV_DEBUG) {
            self.debug = raw == "1" || raw.eq_ignore_ascii_case("true");
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
    data: RwLock<AppConfig>,
}

impl ConfigStore {
    /// Reads `path` when it exists, then applies environment overrides.
    /// A malformed file falls back to defaults.
    pub fn load(path: PathBuf) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(path: PathBuf, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Invalid config at {}: {err}; using defaults", path.display());
                AppConfig::default()
            })
        } else {
            AppConfig::default()
        };
        data.apply_env(lookup);

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> AppConfig {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, config: AppConfig) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.persist(&config)?;
        *guard = config;
        Ok(())
    }

    fn persist(&self, data: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write config to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load_with_env(dir.path().join("config.json"), no_env).unwrap();
        assert_eq!(store.get(), AppConfig::default());
        assert_eq!(store.get().redirect_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_default_database_location() {
        assert_eq!(AppConfig::default().database_path, PathBuf::from("letterbox.sqlite3"));

        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::in_dir(dir.path());
        assert_eq!(config.database_path, dir.path().join("letterbox.sqlite3"));
        assert_eq!(config.redirect_delay_ms, 2_000);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "redirect_delay_ms": 500 }"#).unwrap();

        let config = ConfigStore::load_with_env(path, no_env).unwrap().get();
        assert_eq!(config.redirect_delay_ms, 500);
        assert_eq!(config.browse_limit, 20);
        assert!(!config.debug);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let store = ConfigStore::load_with_env(path, no_env).unwrap();
        assert_eq!(store.get(), AppConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "redirect_delay_ms": 500, "debug": false }"#).unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_DB_PATH, "/tmp/letters.db"),
            (ENV_REDIRECT_DELAY_MS, "0"),
            (ENV_DEBUG, "TRUE"),
        ]
        .into_iter()
        .collect();

        let config = ConfigStore::load_with_env(path, |key| env.get(key).map(|v| v.to_string()))
            .unwrap()
            .get();
        assert_eq!(config.database_path, PathBuf::from("/tmp/letters.db"));
        assert_eq!(config.redirect_delay_ms, 0);
        assert!(config.debug);
    }

    #[test]
    fn test_bad_delay_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(|key| (key == ENV_REDIRECT_DELAY_MS).then(|| "soon".to_string()));
        assert_eq!(config.redirect_delay_ms, 2_000);
    }

    #[test]
    fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = ConfigStore::load_with_env(path.clone(), no_env).unwrap();

        let mut config = store.get();
        config.browse_limit = 5;
        store.update(config.clone()).unwrap();

        let reloaded = ConfigStore::load_with_env(path, no_env).unwrap();
        assert_eq!(reloaded.get(), config);
    }
}
