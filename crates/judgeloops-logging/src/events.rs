use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Which part of the evaluation produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Generation,
    Judging,
    /// Writing the human review sheet
    Export,
    Alignment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Generation => write!(f, "generation"),
            Stage::Judging => write!(f, "judging"),
            Stage::Export => write!(f, "export"),
            Stage::Alignment => write!(f, "alignment"),
        }
    }
}

/// Structured log events for the evaluation stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    StageStarted {
        stage: Stage,
        total: usize,
        provider: String,
    },
    /// Input records dropped while loading a file
    RecordsSkipped {
        stage: Stage,
        path: PathBuf,
        count: usize,
    },
    CaseGenerated {
        index: usize,
        total: usize,
        id: String,
        attempts: u32,
    },
    /// Every attempt failed; the case was written with the failure sentinel
    GenerationFailed {
        index: usize,
        total: usize,
        id: String,
        error: String,
    },
    CaseJudged {
        id: String,
        worker: usize,
        passed: bool,
        attempts: u32,
    },
    JudgeErrored {
        id: String,
        worker: usize,
        error: String,
    },
    RowJudged {
        processed: usize,
        agreement_pct: f64,
    },
    Mismatch {
        id: String,
        human: String,
        judge: String,
    },
    RowSkipped {
        id: String,
        error: String,
    },
    StageInterrupted {
        stage: Stage,
        processed: usize,
    },
    StageCompleted {
        stage: Stage,
        processed: usize,
        duration_secs: f64,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for judgeloops events - handles both console output and file logging.
///
/// Shared by every judge worker, so all methods take `&self`.
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::StageStarted {
                stage,
                total,
                provider,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} {} {} {}",
                    "▶".bright_cyan(),
                    stage.to_string().to_uppercase().bright_cyan().bold(),
                    format!("{} item(s)", total).dimmed(),
                    format!("via {}", provider).dimmed()
                );
            }
            LogEvent::RecordsSkipped { path, count, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} skipped {} malformed record(s) in {}",
                    "⚠".bright_yellow(),
                    count,
                    path.display()
                );
            }
            LogEvent::CaseGenerated {
                index,
                total,
                id,
                attempts,
            } => {
                let retry_note = if *attempts > 1 {
                    format!(" after {} attempts", attempts).yellow().to_string()
                } else {
                    String::new()
                };
                let _ = writeln!(
                    stderr,
                    "  {} [{}/{}] {}{}",
                    "✓".bright_green(),
                    index + 1,
                    total,
                    id.dimmed(),
                    retry_note
                );
            }
            LogEvent::GenerationFailed {
                index,
                total,
                id,
                error,
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} [{}/{}] {} {}",
                    "✗".bright_red(),
                    index + 1,
                    total,
                    id,
                    error.bright_red()
                );
            }
            LogEvent::CaseJudged { id, passed, .. } => {
                let mark = if *passed {
                    "✓".bright_green()
                } else {
                    "✗".bright_red()
                };
                let _ = writeln!(stderr, "  {} {}", mark, id.dimmed());
            }
            LogEvent::JudgeErrored { id, error, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {}",
                    "!".bright_yellow(),
                    id,
                    error.yellow()
                );
            }
            LogEvent::RowJudged { .. } => {
                // Too chatty for pretty mode; the final report carries the numbers
            }
            LogEvent::Mismatch { id, human, judge } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} human={} judge={}",
                    "≠".bright_yellow(),
                    id,
                    human.bold(),
                    judge.bold()
                );
            }
            LogEvent::RowSkipped { id, error } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} skipped: {}",
                    "✗".bright_red(),
                    id,
                    error.bright_red()
                );
            }
            LogEvent::StageInterrupted { stage, processed } => {
                let _ = writeln!(
                    stderr,
                    "{} {} interrupted after {} item(s)",
                    "⚠".bright_yellow(),
                    stage,
                    processed
                );
            }
            LogEvent::StageCompleted {
                stage,
                processed,
                duration_secs,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} {} finished: {} item(s) in {:.1}s",
                    "■".bright_blue(),
                    stage,
                    processed,
                    duration_secs
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::StageStarted { stage, total, .. } => {
                format!("[{}] {}:start total={}", timestamp, stage, total)
            }
            LogEvent::RecordsSkipped { stage, count, .. } => {
                format!("[{}] {}:skipped {}", timestamp, stage, count)
            }
            LogEvent::CaseGenerated {
                index,
                total,
                id,
                attempts,
            } => format!(
                "[{}] gen:{}/{} {} attempts={}",
                timestamp,
                index + 1,
                total,
                id,
                attempts
            ),
            LogEvent::GenerationFailed {
                index,
                total,
                id,
                error,
            } => format!(
                "[{}] gen:fail:{}/{} {} {}",
                timestamp,
                index + 1,
                total,
                id,
                error
            ),
            LogEvent::CaseJudged {
                id,
                worker,
                passed,
                attempts,
            } => format!(
                "[{}] judge:w{} {} {} attempts={}",
                timestamp,
                worker,
                id,
                if *passed { "pass" } else { "fail" },
                attempts
            ),
            LogEvent::JudgeErrored { id, worker, error } => {
                format!("[{}] judge:w{} {} error {}", timestamp, worker, id, error)
            }
            LogEvent::RowJudged {
                processed,
                agreement_pct,
            } => format!(
                "[{}] align:{} agreement={:.0}%",
                timestamp, processed, agreement_pct
            ),
            LogEvent::Mismatch { id, human, judge } => format!(
                "[{}] align:mismatch {} human={} judge={}",
                timestamp, id, human, judge
            ),
            LogEvent::RowSkipped { id, error } => {
                format!("[{}] align:skip {} {}", timestamp, id, error)
            }
            LogEvent::StageInterrupted { stage, processed } => {
                format!("[{}] {}:interrupted {}", timestamp, stage, processed)
            }
            LogEvent::StageCompleted {
                stage,
                processed,
                duration_secs,
            } => format!(
                "[{}] {}:done {} {:.1}s",
                timestamp, stage, processed, duration_secs
            ),
        };
        let _ = writeln!(stderr, "{}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("fancy".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_event_is_tagged() {
        let event = LogEvent::CaseJudged {
            id: "5a8b".into(),
            worker: 2,
            passed: true,
            attempts: 1,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "case_judged");
        assert_eq!(json["worker"], 2);
    }

    #[test]
    fn test_export_skips_are_tagged_with_export_stage() {
        let event = LogEvent::RecordsSkipped {
            stage: Stage::Export,
            path: "data/generated.jsonl".into(),
            count: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "records_skipped");
        assert_eq!(json["stage"], "export");
        assert_eq!(Stage::Export.to_string(), "export");
        assert_ne!(Stage::Export, Stage::Alignment);
    }

    #[test]
    fn test_file_log_gets_timestamped_json_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("run.jsonl");
        let logger = Logger::with_file(LogFormat::Compact, &path).unwrap();

        logger.log(&LogEvent::StageStarted {
            stage: Stage::Judging,
            total: 3,
            provider: "cat".into(),
        });
        logger.log(&LogEvent::StageCompleted {
            stage: Stage::Judging,
            processed: 3,
            duration_secs: 0.5,
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "stage_started");
        assert_eq!(lines[0]["stage"], "judging");
        assert!(lines[1]["timestamp"].is_string());
    }
}
