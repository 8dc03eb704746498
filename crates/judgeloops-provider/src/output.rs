use std::time::Duration;

/// Output captured from one provider process
#[derive(Debug, Clone)]
pub struct ProviderOutput {
    /// Everything the process wrote to stdout
    pub stdout: String,
    /// Everything the process wrote to stderr
    pub stderr: String,
    /// Exit code (-1 when killed by a signal)
    pub exit_code: i32,
    /// Wall-clock duration of the call
    pub duration: Duration,
}

impl ProviderOutput {
    pub fn new(stdout: String, stderr: String, exit_code: i32, duration: Duration) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            duration,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// The answer text, trimmed of surrounding whitespace
    pub fn text(&self) -> &str {
        self.stdout.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_trimmed() {
        let output = ProviderOutput::new("\n  Paris \n".into(), String::new(), 0, Duration::ZERO);
        assert_eq!(output.text(), "Paris");
        assert!(output.success());
    }

    #[test]
    fn test_non_zero_exit_is_not_success() {
        let output = ProviderOutput::new(String::new(), "boom".into(), 2, Duration::ZERO);
        assert!(!output.success());
    }
}
