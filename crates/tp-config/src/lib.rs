//! tp-config: named simulation parameters from files and the environment.
//!
//! Precedence, lowest first: built-in defaults, a YAML/JSON parameter file,
//! a `.env` file, the process environment. Command-line flags are applied by
//! the caller on top of the resolved [`ParameterConfig`].

pub mod env;
pub mod schema;

pub use env::{EnvSource, Layered, MapEnv, ProcessEnv, load_dotenv, parse_dotenv};
pub use schema::{ENV_KEYS, ParameterConfig};

use std::path::{Path, PathBuf};
use tracing::debug;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown parameter: {0}")]
    UnknownKey(String),

    #[error("Unsupported config format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Invalid parameters: {0}")]
    Sim(#[from] tp_sim::SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ConfigResult<ParameterConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

pub fn save_yaml(path: &Path, config: &ParameterConfig) -> ConfigResult<()> {
    config.to_parameters()?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ConfigResult<ParameterConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_json(path: &Path, config: &ParameterConfig) -> ConfigResult<()> {
    config.to_parameters()?;
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a parameter file, choosing the format from its extension.
pub fn load_file(path: &Path) -> ConfigResult<ParameterConfig> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => load_yaml(path),
        Some("json") => load_json(path),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Where to look for parameters.
pub struct ConfigSources<'a> {
    pub file: Option<&'a Path>,
    pub dotenv: Option<&'a Path>,
    pub env: &'a dyn EnvSource,
}

/// Layer every source over the defaults. The result is not validated;
/// call [`ParameterConfig::to_parameters`] once flags are applied.
pub fn resolve(sources: &ConfigSources<'_>) -> ConfigResult<ParameterConfig> {
    let mut config = match sources.file {
        Some(path) => {
            debug!(path = %path.display(), "loading parameter file");
            load_file(path)?
        }
        None => ParameterConfig::default(),
    };

    let applied = match sources.dotenv {
        Some(path) => {
            let file_env = load_dotenv(path)?;
            debug!(path = %path.display(), keys = file_env.len(), "loaded .env file");
            config.apply_env(&Layered {
                primary: sources.env,
                fallback: &file_env,
            })?
        }
        None => config.apply_env(sources.env)?,
    };
    if !applied.is_empty() {
        debug!(keys = ?applied, "applied environment overrides");
    }

    Ok(config)
}
