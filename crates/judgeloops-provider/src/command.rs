use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::{ProcessSpawner, Provider, ProviderConfig, ProviderError};

/// Provider that runs an external command once per prompt.
///
/// The prompt goes to the command's stdin; its trimmed stdout is the answer.
pub struct CommandProvider {
    binary_path: PathBuf,
    args: Vec<String>,
    config: ProviderConfig,
    display_name: String,
}

impl CommandProvider {
    pub fn new(binary_path: impl Into<PathBuf>, args: Vec<String>) -> Self {
        let binary_path = binary_path.into();
        let display_name = binary_path.display().to_string();
        Self {
            binary_path,
            args,
            config: ProviderConfig::default(),
            display_name,
        }
    }

    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl Provider for CommandProvider {
    fn name(&self) -> &str {
        &self.display_name
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(
            provider = self.name(),
            prompt_len = prompt.len(),
            "Generating"
        );

        let output =
            ProcessSpawner::spawn(&self.binary_path, &self.args, prompt, &self.config).await?;

        if !output.success() {
            let status = if output.exit_code < 0 {
                "terminated by signal".to_string()
            } else {
                format!("exit status {}", output.exit_code)
            };
            return Err(ProviderError::CommandFailed {
                status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output.text().to_string())
    }
}

/// Split a comma-separated argument list, the way the CLI flags accept them.
/// An empty string yields no arguments.
pub fn split_args(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::to_string).collect()
}
