//! # Configuration Module
//!
//! The single JSON configuration document the analyzer recognizes at
//! startup, deserialized with `serde`. [`Config`] is a plain value threaded
//! through constructors rather than a process-wide static: [`reachability`],
//! [`driver`], and [`solver`] all take a `&Config` (or the individual fields
//! they need) instead of reaching for a global.
//!
//! [`reachability`]: crate::reachability
//! [`driver`]: crate::driver
//! [`solver`]: crate::solver

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "./analysis-config.json";

fn default_max_batch_size() -> usize {
    1000
}
fn default_precision_digits() -> u32 {
    6
}
fn default_save_interval() -> usize {
    100
}
fn default_output_directory() -> String {
    "./analysis-results".to_string()
}
fn default_draw_value() -> f64 {
    0.0
}

/// `analysis.*` configuration keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Per-batch ceiling on the number of states the driver solves before
    /// flushing (default 1000).
    #[serde(rename = "maxBatchSize", default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Number of decimal digits stored probabilities and values are rounded
    /// to as a post-processing step (default 6).
    #[serde(rename = "precisionDigits", default = "default_precision_digits")]
    pub precision_digits: u32,

    /// How many states the driver solves between checkpoint flushes within
    /// a batch (default 100).
    #[serde(rename = "saveInterval", default = "default_save_interval")]
    pub save_interval: usize,

    /// Root directory the reachability and strategy stores are written
    /// under (default `./analysis-results`).
    #[serde(rename = "outputDirectory", default = "default_output_directory")]
    pub output_directory: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            max_batch_size: default_max_batch_size(),
            precision_digits: default_precision_digits(),
            save_interval: default_save_interval(),
            output_directory: default_output_directory(),
        }
    }
}

/// `evaluation.*` configuration keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Player-1-perspective payoff assigned to draws (default 0.0).
    #[serde(default = "default_draw_value")]
    pub draw: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            draw: default_draw_value(),
        }
    }
}

/// The resolved configuration document. Every key is optional in the JSON
/// file on disk; missing keys take the documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub evaluation: EvaluationConfig,
}

impl Config {
    /// Loads configuration from `path`, or `./analysis-config.json` if
    /// `path` is `None` and that file exists, or the documented defaults if
    /// neither is available. Unknown keys in the JSON document are ignored
    /// (forward compatible); keys absent from the document take their
    /// default.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Some(default.to_path_buf())
                } else {
                    None
                }
            },
        };

        match resolved {
            Some(p) => {
                let contents = fs::read_to_string(&p).map_err(|e| {
                    anyhow::anyhow!("failed to read config file {}: {e}", p.display())
                })?;
                let config: Config = serde_json::from_str(&contents).map_err(|e| {
                    anyhow::anyhow!("failed to parse config file {}: {e}", p.display())
                })?;
                Ok(config)
            },
            None => Ok(Config::default()),
        }
    }

    /// The directory reachability state hashes are persisted under:
    /// `state-hashes/`, rooted at `outputDirectory`'s parent (see
    /// [`crate::reachability`]).
    pub fn reachability_directory(&self) -> std::path::PathBuf {
        Path::new(&self.analysis.output_directory)
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("state-hashes")
    }

    /// The directory analysis results (strategies, `progress.json`) are
    /// persisted under.
    pub fn results_directory(&self) -> std::path::PathBuf {
        Path::new(&self.analysis.output_directory).to_path_buf()
    }
}
