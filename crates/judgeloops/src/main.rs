use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use judgeloops_logging::{init_tracing, LogFormat, Logger};

mod config;
mod report;
mod stages;

use config::{Overrides, ProjectConfig, RunConfig};

/// Exit code after Ctrl+C, as a shell reports SIGINT
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser, Debug)]
#[command(
    name = "judgeloops",
    about = "Generate answers, grade them with an LLM judge, and check the judge against humans",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Working directory; relative paths are resolved against it
    #[arg(short = 'd', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Config file (default: ./judgeloops.toml, then the global config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,

    /// Also append events as JSON lines to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Generator CLI command
    #[arg(long, global = true)]
    generator_cmd: Option<String>,

    /// Comma-separated arguments for the generator command
    #[arg(long, global = true, allow_hyphen_values = true)]
    generator_args: Option<String>,

    /// Judge CLI command
    #[arg(long, global = true)]
    judge_cmd: Option<String>,

    /// Comma-separated arguments for the judge command
    #[arg(long, global = true, allow_hyphen_values = true)]
    judge_args: Option<String>,

    /// Print the final report as JSON on stdout
    #[arg(long, global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample hard HotpotQA questions into a golden set
    Prep {
        /// Raw HotpotQA dump (JSON array)
        #[arg(long, default_value = "data/hotpot_dev.json")]
        input: PathBuf,

        #[arg(long, default_value = "data/golden_set.jsonl")]
        output: PathBuf,

        /// Number of hard cases to sample
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Seed the shuffle for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Answer every golden-set question with the generator
    Generate {
        #[arg(long, default_value = "data/golden_set.jsonl")]
        input: PathBuf,

        #[arg(long, default_value = "data/eval_dataset_generated.jsonl")]
        output: PathBuf,
    },
    /// Grade generated answers with the judge
    Judge {
        #[arg(long, default_value = "data/eval_dataset_generated.jsonl")]
        input: PathBuf,

        /// Failed case IDs are written here
        #[arg(long, default_value = "data/failures.log")]
        failures: PathBuf,

        /// Number of parallel judge workers
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Write a CSV sheet for human review
    Export {
        #[arg(long, default_value = "data/eval_dataset_generated.jsonl")]
        input: PathBuf,

        #[arg(long, default_value = "data/manual_review.csv")]
        output: PathBuf,
    },
    /// Measure judge agreement with human labels
    Align {
        /// Review sheet with the label column filled in
        #[arg(long, default_value = "data/manual_review_done.csv")]
        labels: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

/// Everything a stage needs, built once at startup
pub struct RunContext {
    pub working_dir: PathBuf,
    pub config: RunConfig,
    pub logger: Arc<Logger>,
    pub interrupted: Arc<AtomicBool>,
    pub json_output: bool,
}

impl RunContext {
    /// Resolve `path` against the working directory
    pub fn path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    pub fn was_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing("warn", log_format);

    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let file_config = match cli.config.as_deref() {
        Some(path) => Some(ProjectConfig::load_required(path)?),
        None => ProjectConfig::discover(&working_dir)?,
    };

    let workers = match &cli.command {
        Command::Judge { workers, .. } => *workers,
        _ => None,
    };
    let overrides = Overrides {
        generator_cmd: cli.generator_cmd.clone(),
        generator_args: cli.generator_args.clone(),
        judge_cmd: cli.judge_cmd.clone(),
        judge_args: cli.judge_args.clone(),
        workers,
    };
    let config = RunConfig::resolve(file_config, &overrides);

    let logger = match cli.log_file.as_deref() {
        Some(path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupt_handle = interrupted.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Finishing in-flight work...");
        interrupt_handle.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let ctx = RunContext {
        working_dir,
        config,
        logger: Arc::new(logger),
        interrupted,
        json_output: cli.json_output,
    };

    match cli.command {
        Command::Prep {
            input,
            output,
            limit,
            seed,
        } => stages::prep(&ctx, &input, &output, limit, seed)?,
        Command::Generate { input, output } => stages::generate(&ctx, &input, &output).await?,
        Command::Judge {
            input, failures, ..
        } => stages::judge(&ctx, &input, &failures).await?,
        Command::Export { input, output } => stages::export(&ctx, &input, &output)?,
        Command::Align { labels } => stages::align(&ctx, &labels).await?,
    }

    if ctx.was_interrupted() {
        std::process::exit(EXIT_INTERRUPTED);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "judgeloops",
            "judge",
            "--workers",
            "8",
            "--judge-args",
            "--model,flash",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.judge_args.as_deref(), Some("--model,flash"));
        assert!(matches!(cli.log_format, LogFormatChoice::Json));
        match cli.command {
            Command::Judge {
                workers, failures, ..
            } => {
                assert_eq!(workers, Some(8));
                assert_eq!(failures, PathBuf::from("data/failures.log"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_prep_defaults() {
        let cli = Cli::try_parse_from(["judgeloops", "prep"]).unwrap();
        match cli.command {
            Command::Prep { limit, seed, .. } => {
                assert_eq!(limit, 50);
                assert_eq!(seed, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_context_resolves_relative_paths() {
        let ctx = RunContext {
            working_dir: PathBuf::from("/tmp/evals"),
            config: RunConfig::resolve(None, &Overrides::default()),
            logger: Arc::new(Logger::new(LogFormat::Compact)),
            interrupted: Arc::new(AtomicBool::new(false)),
            json_output: false,
        };

        assert_eq!(
            ctx.path(Path::new("data/x.jsonl")),
            PathBuf::from("/tmp/evals/data/x.jsonl")
        );
        assert_eq!(ctx.path(Path::new("/abs/y")), PathBuf::from("/abs/y"));
    }
}
