//! Configuration for a run.
//! Read from `upside.toml`; every field has a default and CLI flags win.

use crate::cli::Cli;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use upside_core::{ScenarioLimits, SolverOptions};

/// File looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "upside.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UpsideConfig {
    /// Input and model locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Solver options handed to AMPL
    #[serde(default)]
    pub solver: SolverOptions,
    /// Scalar model limits
    #[serde(default)]
    pub limits: ScenarioLimits,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    #[serde(default = "default_model")]
    pub model: PathBuf,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// AMPL executable; searched for when unset
    #[serde(default)]
    pub ampl: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            data_dir: default_data_dir(),
            ampl: None,
        }
    }
}

fn default_model() -> PathBuf {
    PathBuf::from("models").join("two_markets.mod")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data").join("balanced")
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReportConfig {
    /// Append the accepted-bid listing
    #[serde(default)]
    pub show_accepted: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl UpsideConfig {
    /// Load the configuration.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config '{}'", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("parsing config '{}'", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply command-line overrides.
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.data_dir {
            self.paths.data_dir = dir.clone();
        }
        if let Some(model) = &cli.model {
            self.paths.model = model.clone();
        }
        if let Some(ampl) = &cli.ampl {
            self.paths.ampl = Some(ampl.clone());
        }
        if cli.verbose_solver {
            self.solver.verbose = true;
        }
        if cli.show_accepted {
            self.report.show_accepted = true;
        }
        if let Some(level) = cli.log_level {
            self.logging.level = level.to_string();
        }
        self
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .parse()
            .map_err(|_| anyhow!("invalid log level '{}'", self.logging.level))
    }
}
