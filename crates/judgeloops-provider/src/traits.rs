use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while asking a provider for text
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to spawn provider process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider command failed: {status} | stderr: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Provider execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Provider returned an empty response")]
    EmptyOutput,
}

impl ProviderError {
    /// Captured diagnostic output, if the failure carried any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ProviderError::CommandFailed { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}

/// Configuration applied to every process a provider spawns
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Working directory for the child (None = inherit)
    pub working_dir: Option<PathBuf>,
    /// Per-call timeout (None = no limit)
    pub timeout: Option<Duration>,
    /// Additional environment variables
    pub env_vars: HashMap<String, String>,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_env(mut self, key: String, value: String) -> Self {
        self.env_vars.insert(key, value);
        self
    }
}

/// Something that turns a prompt into text.
///
/// Implementations must be safe to call from many tasks at once; the judge
/// pipeline shares one provider across all of its workers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Produce text for the given prompt
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}
