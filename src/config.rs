//! Optional YAML configuration for `audit` runs.
//!
//! ```yaml
//! samples_dir: ./samples
//! schema: ./airtable_schema.json
//! max_records: 50
//! output_dir: ./data/audit
//! tables:
//!   - Bookings
//!   - Guests
//! ```
//!
//! Command-line flags take precedence over every key.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    #[serde(default)]
    pub samples_dir: Option<PathBuf>,
    #[serde(default)]
    pub schema: Option<PathBuf>,
    #[serde(default)]
    pub tables: Vec<String>,
    #[serde(default)]
    pub max_records: Option<usize>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl AuditConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Resolves relative paths against `base`, normally the directory holding
    /// the config file.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |path: Option<PathBuf>| {
            path.map(|p| if p.is_relative() { base.join(p) } else { p })
        };
        self.samples_dir = resolve(self.samples_dir);
        self.schema = resolve(self.schema);
        self.output_dir = resolve(self.output_dir);
        self
    }
}
