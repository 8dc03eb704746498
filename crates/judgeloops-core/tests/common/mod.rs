#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use judgeloops_dataset::{EvalCase, GeneratedCase};
use judgeloops_logging::{LogFormat, Logger};
use judgeloops_provider::{Provider, ProviderError};

type Reply = dyn Fn(&str) -> Result<String, ProviderError> + Send + Sync;

/// Deterministic provider driven by a closure over the prompt
pub struct StubProvider {
    reply: Box<Reply>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StubProvider {
    pub fn new<F>(reply: F) -> Self
    where
        F: Fn(&str) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Self {
            reply: Box::new(reply),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Hold every call open for `delay` before replying
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let reply = (self.reply)(prompt);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }
}

pub fn quiet_logger() -> Arc<Logger> {
    Arc::new(Logger::new(LogFormat::Compact))
}

pub fn case(id: &str, prompt: &str, reference: &str) -> EvalCase {
    EvalCase {
        id: id.to_string(),
        prompt: prompt.to_string(),
        reference: reference.to_string(),
    }
}

/// `n` generated cases whose answers are tagged `parity-even` or
/// `parity-odd` by index
pub fn parity_cases(n: usize) -> Vec<GeneratedCase> {
    (0..n)
        .map(|i| {
            let parity = if i % 2 == 0 { "even" } else { "odd" };
            GeneratedCase::new(
                case(&format!("case-{i}"), "question", "reference"),
                format!("answer parity-{parity}"),
            )
        })
        .collect()
}

/// Judge that passes even-tagged answers and fails the rest
pub fn parity_judge() -> StubProvider {
    StubProvider::new(|prompt| {
        if prompt.contains("parity-even") {
            Ok("1".to_string())
        } else {
            Ok("0".to_string())
        }
    })
}
