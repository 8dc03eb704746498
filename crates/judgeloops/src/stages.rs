use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;

use judgeloops_core::{Aggregator, AlignmentCalibrator, GenerationRunner, JudgePipeline};
use judgeloops_dataset::{
    export_review_template, load_hotpot, load_review, read_jsonl, sample_golden_set, write_jsonl,
    EvalCase, GeneratedCase, JsonlWriter,
};
use judgeloops_logging::{LogEvent, Stage};
use judgeloops_provider::{CommandProvider, Provider, ProviderConfig};

use crate::config::CommandSettings;
use crate::report;
use crate::RunContext;

pub fn prep(
    ctx: &RunContext,
    input: &Path,
    output: &Path,
    limit: usize,
    seed: Option<u64>,
) -> Result<()> {
    let input = ctx.path(input);
    let output = ctx.path(output);

    let records = load_hotpot(&input)?;
    let available = records.len();

    let cases = match seed {
        Some(seed) => sample_golden_set(records, limit, &mut StdRng::seed_from_u64(seed)),
        None => sample_golden_set(records, limit, &mut rand::thread_rng()),
    };

    ensure_parent_dir(&output)?;
    let written = write_jsonl(&output, &cases)?;

    report::print_prep(ctx, available, written, &output);
    Ok(())
}

pub async fn generate(ctx: &RunContext, input: &Path, output: &Path) -> Result<()> {
    let input = ctx.path(input);
    let output = ctx.path(output);

    let cases: Vec<EvalCase> = load_records(ctx, &input, Stage::Generation)?;
    let provider = command_provider(ctx, &ctx.config.generator);

    ensure_parent_dir(&output)?;
    let mut writer = JsonlWriter::create(&output)?;

    let runner = GenerationRunner::new(
        &provider,
        ctx.config.generation_retry,
        ctx.logger.clone(),
    )
    .with_interrupt(ctx.interrupted.clone());

    let summary = runner.run(cases, &mut writer).await?;

    report::print_generation(ctx, &summary, &output)
}

pub async fn judge(ctx: &RunContext, input: &Path, failures: &Path) -> Result<()> {
    let input = ctx.path(input);
    let failures = ctx.path(failures);

    let started = Instant::now();
    let cases: Vec<GeneratedCase> = load_records(ctx, &input, Stage::Judging)?;
    let provider: Arc<dyn Provider> = Arc::new(command_provider(ctx, &ctx.config.judge));

    let pipeline = JudgePipeline::new(
        provider,
        ctx.config.workers,
        ctx.config.judging_retry,
        ctx.logger.clone(),
    )?
    .with_interrupt(ctx.interrupted.clone());

    ensure_parent_dir(&failures)?;
    let mut aggregator = Aggregator::create(&failures)?.with_start(started);

    let score = pipeline.run(cases, &mut aggregator).await?;

    report::print_score(ctx, &score, &failures)
}

pub fn export(ctx: &RunContext, input: &Path, output: &Path) -> Result<()> {
    let input = ctx.path(input);
    let output = ctx.path(output);

    let cases: Vec<GeneratedCase> = load_records(ctx, &input, Stage::Export)?;

    ensure_parent_dir(&output)?;
    let written = export_review_template(&output, &cases)?;

    report::print_export(ctx, written, &output);
    Ok(())
}

pub async fn align(ctx: &RunContext, labels: &Path) -> Result<()> {
    let labels = ctx.path(labels);

    let sheet = load_review(&labels)?;
    if !sheet.skipped.is_empty() {
        ctx.logger.log(&LogEvent::RecordsSkipped {
            stage: Stage::Alignment,
            path: labels.clone(),
            count: sheet.skipped.len(),
        });
    }

    let provider = command_provider(ctx, &ctx.config.judge);
    let calibrator = AlignmentCalibrator::new(&provider, ctx.logger.clone())
        .with_throttle(ctx.config.throttle)
        .with_interrupt(ctx.interrupted.clone());

    let calibration = calibrator.run(&sheet.rows).await;

    report::print_calibration(ctx, &calibration, sheet.unlabeled)
}

fn command_provider(ctx: &RunContext, settings: &CommandSettings) -> CommandProvider {
    let mut config = ProviderConfig::new().with_working_dir(ctx.working_dir.clone());
    if let Some(timeout) = settings.timeout {
        config = config.with_timeout(timeout);
    }

    CommandProvider::new(&settings.command, settings.args.clone()).with_config(config)
}

/// Read a JSON Lines file, reporting any lines that had to be dropped
fn load_records<T: DeserializeOwned>(
    ctx: &RunContext,
    path: &Path,
    stage: Stage,
) -> Result<Vec<T>> {
    let loaded = read_jsonl::<T>(path)?;

    if !loaded.skipped.is_empty() {
        ctx.logger.log(&LogEvent::RecordsSkipped {
            stage,
            path: path.to_path_buf(),
            count: loaded.skipped.len(),
        });
    }

    Ok(loaded.records)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display())),
        _ => Ok(()),
    }
}
