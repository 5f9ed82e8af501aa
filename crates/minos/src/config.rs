//! Configuration for the Minos grading harness

use std::env;

use olympus_common::ReportFormat;

use crate::random::WordSetSpec;

const DEFAULT_CANDIDATE_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_REFERENCE_TIMEOUT_MS: u64 = 0;

/// Harness configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Environment (development, ci, ...)
    pub environment: String,

    /// Report settings
    pub report: ReportConfig,

    /// Invocation limits
    pub execution: ExecutionConfig,

    /// Random input settings
    pub random: RandomConfig,

    /// Print Prometheus metrics to stderr when a driver finishes
    pub dump_metrics: bool,
}

/// Report configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Text or JSON lines
    pub format: ReportFormat,

    /// Exit non-zero when any case did not match
    pub strict: bool,
}

/// Invocation limits configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Candidate time budget in milliseconds, 0 for none
    pub candidate_timeout_ms: u64,

    /// Reference time budget in milliseconds, 0 for none
    pub reference_timeout_ms: u64,
}

/// Random input configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RandomConfig {
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,

    /// Shape of generated word lists
    pub words: WordSetSpec,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            report: ReportConfig {
                format: ReportFormat::Text,
                strict: false,
            },
            execution: ExecutionConfig {
                candidate_timeout_ms: DEFAULT_CANDIDATE_TIMEOUT_MS,
                reference_timeout_ms: DEFAULT_REFERENCE_TIMEOUT_MS,
            },
            random: RandomConfig {
                seed: None,
                words: WordSetSpec::default(),
            },
            dump_metrics: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let words = match parse_var::<usize, _>(&lookup, "MINOS_WORDS_MAX_ENTRIES")? {
            Some(max_entries) => defaults
                .random
                .words
                .with_max_entries(max_entries)
                .map_err(|_| ConfigError::InvalidValue("MINOS_WORDS_MAX_ENTRIES".to_string()))?,
            None => defaults.random.words,
        };

        Ok(Self {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            report: ReportConfig {
                format: parse_var(&lookup, "MINOS_REPORT_FORMAT")?
                    .unwrap_or(defaults.report.format),
                strict: parse_flag(&lookup, "MINOS_STRICT")?.unwrap_or(defaults.report.strict),
            },
            execution: ExecutionConfig {
                candidate_timeout_ms: parse_var(&lookup, "MINOS_CANDIDATE_TIMEOUT_MS")?
                    .unwrap_or(defaults.execution.candidate_timeout_ms),
                reference_timeout_ms: parse_var(&lookup, "MINOS_REFERENCE_TIMEOUT_MS")?
                    .unwrap_or(defaults.execution.reference_timeout_ms),
            },
            random: RandomConfig {
                seed: parse_var(&lookup, "MINOS_SEED")?,
                words,
            },
            dump_metrics: parse_flag(&lookup, "MINOS_DUMP_METRICS")?
                .unwrap_or(defaults.dump_metrics),
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        _ => Ok(None),
    }
}

fn parse_flag<F>(lookup: &F, key: &str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue(key.to_string())),
        },
    }
}

/// Configuration loading errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
