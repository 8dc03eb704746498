use std::time::Duration;

use judgeloops_provider::{CommandProvider, Provider, ProviderConfig, ProviderError};

fn sh(script: &str) -> CommandProvider {
    CommandProvider::new("sh", vec!["-c".to_string(), script.to_string()])
}

#[tokio::test]
async fn test_prompt_is_written_to_stdin() {
    let provider = CommandProvider::new("cat", vec![]);
    let answer = provider.generate("  What is 2+2?\n").await.unwrap();
    assert_eq!(answer, "What is 2+2?");
}

#[tokio::test]
async fn test_large_prompt_does_not_deadlock() {
    let provider = CommandProvider::new("cat", vec![]);
    let prompt = "x".repeat(1 << 20);
    let answer = provider.generate(&prompt).await.unwrap();
    assert_eq!(answer.len(), prompt.len());
}

#[tokio::test]
async fn test_non_zero_exit_carries_stderr() {
    let provider = sh("echo 'model not found' >&2; exit 3");
    let err = provider.generate("hello").await.unwrap_err();

    match &err {
        ProviderError::CommandFailed { status, stderr } => {
            assert_eq!(status, "exit status 3");
            assert_eq!(stderr, "model not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("model not found"));
    assert_eq!(err.stderr(), Some("model not found"));
}

#[tokio::test]
async fn test_stderr_is_ignored_on_success() {
    let provider = sh("cat >/dev/null; echo 'warming up' >&2; echo 1");
    assert_eq!(provider.generate("judge this").await.unwrap(), "1");
}

#[tokio::test]
async fn test_child_that_ignores_stdin() {
    let provider = sh("echo fixed");
    assert_eq!(provider.generate("unused").await.unwrap(), "fixed");
}

#[tokio::test]
async fn test_missing_binary_is_spawn_failure() {
    let provider = CommandProvider::new("/nonexistent/judgeloops-provider", vec![]);
    let err = provider.generate("hi").await.unwrap_err();
    assert!(matches!(err, ProviderError::SpawnFailed(_)));
}

#[tokio::test]
async fn test_timeout_kills_slow_process() {
    let provider =
        sh("sleep 5").with_config(ProviderConfig::new().with_timeout(Duration::from_millis(100)));
    let err = provider.generate("hi").await.unwrap_err();
    assert!(matches!(err, ProviderError::Timeout(d) if d == Duration::from_millis(100)));
}

#[tokio::test]
async fn test_env_vars_are_passed() {
    let provider = sh("cat >/dev/null; printf %s \"$JUDGE_MODEL\"").with_config(
        ProviderConfig::new().with_env("JUDGE_MODEL".into(), "llama3.3".into()),
    );
    assert_eq!(provider.generate("").await.unwrap(), "llama3.3");
}
