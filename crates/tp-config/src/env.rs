//! Environment-variable sources and `.env` files.
//!
//! Lookups go through [`EnvSource`] so tests can supply a map instead of
//! mutating the process environment.

use std::collections::HashMap;
use std::path::Path;

use crate::ConfigResult;

/// Read-only key/value lookup.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvSource for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// `primary` wins; `fallback` only fills keys `primary` lacks.
///
/// Used to put a `.env` file underneath the process environment, so a
/// variable exported in the shell is never overridden by the file.
pub struct Layered<'a> {
    pub primary: &'a dyn EnvSource,
    pub fallback: &'a dyn EnvSource,
}

impl EnvSource for Layered<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.primary.get(key).or_else(|| self.fallback.get(key))
    }
}

/// Parse `KEY=VALUE` lines. Blank lines and `#` comments are skipped, a
/// single pair of surrounding quotes is removed, and lines without `=` are
/// ignored. Later duplicates win.
pub fn parse_dotenv(content: &str) -> MapEnv {
    let mut vars = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().trim_start_matches("export ").trim();
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    MapEnv { vars }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Read and parse a `.env` file.
pub fn load_dotenv(path: &Path) -> ConfigResult<MapEnv> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_dotenv(&content))
}
