//! Configuration for HAR to OpenAPI generation.
//!
//! This module defines the `GenerateConfig` struct and the small input
//! parsing helpers the CLI layer leans on. The configuration can be created
//! programmatically, built from command-line arguments, or loaded from a
//! YAML file so repeat runs do not need the flags re-typed.
//!
//! # Examples
//!
//! ```
//! use harspec_core::config::{parse_domains, GenerateConfig};
//!
//! let domains = parse_domains("example.com, api.example.com");
//! let config = GenerateConfig::new("capture.har", domains);
//! assert!(config.output_path.is_none());
//! ```

// Internal imports (std, crate)
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Configuration for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Path to the HAR capture file
    pub har_path: PathBuf,

    /// Domains whose traffic belongs to the target service
    pub domains: Vec<String>,

    /// Where to write the generated document; defaults to a sibling of the
    /// input with a `.openapi.json` extension
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

impl GenerateConfig {
    /// Create a new config with default values
    pub fn new(har_path: impl Into<PathBuf>, domains: Vec<String>) -> Self {
        Self {
            har_path: har_path.into(),
            domains,
            output_path: None,
        }
    }

    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// The path the document will be written to.
    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| default_output_path(&self.har_path))
    }
}

/// Sibling of the input path with the extension replaced by `.openapi.json`.
pub fn default_output_path(har_path: &Path) -> PathBuf {
    har_path.with_extension("openapi.json")
}

/// Split a comma separated domain list, trimming, lowercasing and
/// deduplicating while preserving first-seen order.
pub fn parse_domains(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .split(',')
        .map(|part| part.trim().to_ascii_lowercase())
        .filter(|domain| !domain.is_empty() && seen.insert(domain.clone()))
        .collect()
}

/// Expand a leading `~` to the user's home directory. `~user` forms are not
/// supported.
pub fn expand_user_path(path: &str) -> Result<PathBuf> {
    if !path.starts_with('~') {
        return Ok(PathBuf::from(path));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| Error::config("unable to determine home directory"))?;

    if path == "~" {
        return Ok(home);
    }

    if let Some(rest) = path.strip_prefix("~/") {
        return Ok(home.join(rest));
    }

    Err(Error::config(format!(
        "unsupported user expansion in path {path:?}"
    )))
}
