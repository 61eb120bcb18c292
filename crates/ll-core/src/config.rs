//! Configuration types and parsing for lineagelens.yml

use crate::error::{CoreError, CoreResult};
use crate::workload::{SortKey, WorkloadFilter, DEFAULT_LIMIT, DEFAULT_MIN_CALLS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration from lineagelens.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// SQL dialect used to tokenize workload queries
    #[serde(default)]
    pub dialect: Dialect,

    /// Workload selection
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Where analysis artifacts are written
    #[serde(default)]
    pub output: OutputConfig,
}

/// SQL dialect for tokenizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    Generic,
}

/// Workload selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Maximum number of queries to analyze
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Queries called fewer times are ignored
    #[serde(default = "default_min_calls")]
    pub min_calls: i64,

    #[serde(default)]
    pub sort_by: SortKey,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            min_calls: default_min_calls(),
            sort_by: SortKey::default(),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output directory, relative to the project directory
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// File name prefix for analysis artifacts
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            prefix: default_prefix(),
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_min_calls() -> i64 {
    DEFAULT_MIN_CALLS
}

fn default_output_dir() -> String {
    "target".to_string()
}

fn default_prefix() -> String {
    "analysis".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for lineagelens.yml or lineagelens.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("lineagelens.yml");
        let yaml_path = dir.join("lineagelens.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Like [`load_from_dir`](Self::load_from_dir), but a missing file yields
    /// the defaults
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::load_from_dir(dir) {
            Err(CoreError::ConfigNotFound { path }) => {
                log::debug!("No config at {}, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.analysis.limit == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "analysis.limit must be greater than zero".to_string(),
            });
        }

        if self.output.prefix.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "output.prefix cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Workload filter from the analysis settings
    pub fn workload_filter(&self) -> WorkloadFilter {
        WorkloadFilter {
            min_calls: self.analysis.min_calls,
            limit: self.analysis.limit,
            sort_by: self.analysis.sort_by,
        }
    }

    /// Get absolute output directory
    pub fn output_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.output.dir)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::Generic => write!(f, "generic"),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
