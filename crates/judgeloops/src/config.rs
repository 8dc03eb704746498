//! Configuration file support for judgeloops.
//!
//! Loads `judgeloops.toml` from the working directory, falling back to the
//! global `config.toml` under the user's config directory. Command-line flags
//! are applied on top when the final [`RunConfig`] is resolved.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use judgeloops_core::{RetryPolicy, DEFAULT_THROTTLE};
use judgeloops_provider::split_args;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "judgeloops.toml";

const DEFAULT_GENERATOR_COMMAND: &str = "ollama";
const DEFAULT_GENERATOR_ARGS: [&str; 2] = ["run", "llama3.3"];
const DEFAULT_JUDGE_COMMAND: &str = "gemini";
const DEFAULT_WORKERS: usize = 5;

/// Configuration as written in a config file. Every field is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub generator: ProviderSection,
    #[serde(default)]
    pub judge: ProviderSection,
    #[serde(default)]
    pub generation: RetrySection,
    #[serde(default)]
    pub judging: JudgingSection,
    #[serde(default)]
    pub alignment: AlignmentSection,
}

/// The external command behind a provider
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProviderSection {
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    /// Kill the process if a single call takes longer than this
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    pub max_attempts: Option<u32>,
    #[serde(default, with = "humantime_serde")]
    pub backoff: Option<Duration>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct JudgingSection {
    pub workers: Option<usize>,
    pub max_attempts: Option<u32>,
    #[serde(default, with = "humantime_serde")]
    pub backoff: Option<Duration>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AlignmentSection {
    #[serde(default, with = "humantime_serde")]
    pub throttle: Option<Duration>,
}

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        Self::load_file(&working_dir.join(CONFIG_FILE_NAME))
    }

    /// Load the user-wide configuration, if there is one
    pub fn load_global() -> Result<Option<Self>> {
        match global_config_path() {
            Some(path) => Self::load_file(&path),
            None => Ok(None),
        }
    }

    /// Project file first, then the global one
    pub fn discover(working_dir: &Path) -> Result<Option<Self>> {
        match Self::load(working_dir)? {
            Some(config) => Ok(Some(config)),
            None => Self::load_global(),
        }
    }

    /// Load a file the user named explicitly; it must exist
    pub fn load_required(path: &Path) -> Result<Self> {
        Self::load_file(path)?
            .with_context(|| format!("Config file {} does not exist", path.display()))
    }

    fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }
}

/// `<config_dir>/judgeloops/config.toml`
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("judgeloops").join("config.toml"))
}

/// Values given on the command line. Provider args are comma-separated.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub generator_cmd: Option<String>,
    pub generator_args: Option<String>,
    pub judge_cmd: Option<String>,
    pub judge_args: Option<String>,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandSettings {
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

/// Fully resolved settings for a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub generator: CommandSettings,
    pub judge: CommandSettings,
    pub generation_retry: RetryPolicy,
    pub judging_retry: RetryPolicy,
    pub workers: usize,
    pub throttle: Duration,
}

impl RunConfig {
    /// Priority: command line > config file > built-in default
    pub fn resolve(file: Option<ProjectConfig>, overrides: &Overrides) -> Self {
        let file = file.unwrap_or_default();

        let generator = CommandSettings {
            command: overrides
                .generator_cmd
                .clone()
                .or(file.generator.command)
                .unwrap_or_else(|| DEFAULT_GENERATOR_COMMAND.to_string()),
            args: overrides
                .generator_args
                .as_deref()
                .map(split_args)
                .or(file.generator.args)
                .unwrap_or_else(|| DEFAULT_GENERATOR_ARGS.map(String::from).to_vec()),
            timeout: file.generator.timeout,
        };

        let judge = CommandSettings {
            command: overrides
                .judge_cmd
                .clone()
                .or(file.judge.command)
                .unwrap_or_else(|| DEFAULT_JUDGE_COMMAND.to_string()),
            args: overrides
                .judge_args
                .as_deref()
                .map(split_args)
                .or(file.judge.args)
                .unwrap_or_default(),
            timeout: file.judge.timeout,
        };

        let generation_default = RetryPolicy::generation();
        let judging_default = RetryPolicy::judging();

        Self {
            generator,
            judge,
            generation_retry: RetryPolicy::new(
                file.generation
                    .max_attempts
                    .unwrap_or(generation_default.max_attempts),
                file.generation.backoff.unwrap_or(generation_default.backoff),
            ),
            judging_retry: RetryPolicy::new(
                file.judging
                    .max_attempts
                    .unwrap_or(judging_default.max_attempts),
                file.judging.backoff.unwrap_or(judging_default.backoff),
            ),
            workers: overrides
                .workers
                .or(file.judging.workers)
                .unwrap_or(DEFAULT_WORKERS),
            throttle: file.alignment.throttle.unwrap_or(DEFAULT_THROTTLE),
        }
    }
}
