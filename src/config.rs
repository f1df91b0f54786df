use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Runtime configuration, loaded from `config.toml` under the data
/// directory (or an explicit `--config` path). Missing file means defaults;
/// missing keys fall back per-field.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub data_dir: PathBuf,
    pub screenshots_dir: Option<PathBuf>,
    /// Bearer token gating operator endpoints. When unset, `serve`
    /// generates one per boot and prints it.
    pub operator_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: "127.0.0.1".to_string(),
            api_port: 8642,
            data_dir: default_data_dir(),
            screenshots_dir: None,
            operator_token: None,
        }
    }
}

/// Root data directory. `~/.vigil`, overridable with VIGIL_DATA_DIR
/// (used by tests and service units).
pub fn default_data_dir() -> PathBuf {
    match std::env::var_os("VIGIL_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .expect("Could not find home directory")
            .join(".vigil"),
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_data_dir().join("config.toml"),
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("vigil.db")
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.screenshots_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("screenshots"))
    }
}
